//! # Seed Data Module
//!
//! ## Purpose
//! Defines the static category configuration and the fixed seed collection the
//! store falls back to on first start or when the persisted collection is
//! unreadable.
//!
//! ## Input/Output Specification
//! - **Input**: None (static definitions)
//! - **Output**: Category configuration table, seed document collection
//! - **Invariant**: Seed ids are fixed literals, unique across the set

use crate::{Category, CategoryConfig, Document, LocationInfo};

/// Static configuration for the five catalog categories, in display order.
pub const CATEGORIES: [CategoryConfig; 5] = [
    CategoryConfig {
        id: Category::Laws,
        title: "القوانين الضريبية والمعايير",
        icon: "scale",
        color: "bg-blue-600",
        description: "قوانين الدخل، القيمة المضافة، والإجراءات الموحدة",
    },
    CategoryConfig {
        id: Category::Locations,
        title: "عناوين المأموريات",
        icon: "map-pin",
        color: "bg-emerald-600",
        description: "دليل عناوين المأموريات ونطاق الاختصاص الجغرافي",
    },
    CategoryConfig {
        id: Category::Instructions,
        title: "التعليمات والكتب الدورية",
        icon: "scroll-text",
        color: "bg-slate-600",
        description: "التعليمات التنفيذية والكتب الدورية المنظمة للعمل",
    },
    CategoryConfig {
        id: Category::Decisions,
        title: "القرارات والأحكام",
        icon: "gavel",
        color: "bg-indigo-600",
        description: "أحكام المحاكم وقرارات لجان الطعن الضريبي",
    },
    CategoryConfig {
        id: Category::Fatwas,
        title: "فتاوى البحوث",
        icon: "lightbulb",
        color: "bg-amber-600",
        description: "الآراء والفتاوى الصادرة عن قطاع البحوث الضريبية",
    },
];

/// Look up the static configuration for a category.
pub fn category_config(category: Category) -> &'static CategoryConfig {
    match category {
        Category::Laws => &CATEGORIES[0],
        Category::Locations => &CATEGORIES[1],
        Category::Instructions => &CATEGORIES[2],
        Category::Decisions => &CATEGORIES[3],
        Category::Fatwas => &CATEGORIES[4],
    }
}

/// The fixed seed collection.
///
/// Built fresh on every call so callers own their copy; the definitions
/// themselves never change at runtime.
pub fn seed_documents() -> Vec<Document> {
    vec![
        // Laws
        Document {
            id: "law-91-2005".to_string(),
            category: Category::Laws,
            title: "قانون الضريبة على الدخل رقم 91 لسنة 2005".to_string(),
            date: "2005-06-09".to_string(),
            description: Some(
                "القانون المنظم للضريبة على دخل الأشخاص الطبيعيين والاعتباريين.".to_string(),
            ),
            content: "مادة 1: تسري الضريبة على مجموع صافي دخل الأشخاص الطبيعيين المقيمين بالنسبة لدخولهم المحققة في مصر أو خارجها...".to_string(),
            tags: Some(vec![
                "دخل".to_string(),
                "أشخاص طبيعيين".to_string(),
                "شركات".to_string(),
            ]),
            location: None,
        },
        Document {
            id: "law-206-2020".to_string(),
            category: Category::Laws,
            title: "قانون الإجراءات الضريبية الموحد رقم 206 لسنة 2020".to_string(),
            date: "2020-10-19".to_string(),
            description: Some("قانون لتوحيد إجراءات ربط وتحصيل الضريبة.".to_string()),
            content: "يهدف هذا القانون إلى دمج الإجراءات الضريبية المختلفة وتبسيطها...".to_string(),
            tags: Some(vec!["إجراءات".to_string(), "رقمنة".to_string()]),
            location: None,
        },
        // Locations
        Document {
            id: "loc-cairo-1".to_string(),
            category: Category::Locations,
            title: "مأمورية ضرائب الشركات المساهمة بالقاهرة".to_string(),
            date: "2023-01-01".to_string(),
            description: Some(
                "تختص بمحاسبة الشركات المساهمة داخل نطاق محافظة القاهرة.".to_string(),
            ),
            content: String::new(),
            tags: None,
            location: Some(LocationInfo {
                address: "26 شارع شريف، وسط البلد، القاهرة".to_string(),
                code: "101".to_string(),
                area: "القاهرة الكبرى".to_string(),
            }),
        },
        Document {
            id: "loc-giza-inv".to_string(),
            category: Category::Locations,
            title: "مأمورية استثمار الجيزة".to_string(),
            date: "2023-01-01".to_string(),
            description: Some("تختص بشركات الاستثمار الواقعة في نطاق الجيزة.".to_string()),
            content: String::new(),
            tags: None,
            location: Some(LocationInfo {
                address: "مبنى الضرائب، الحي السابع، 6 أكتوبر".to_string(),
                code: "205".to_string(),
                area: "الجيزة".to_string(),
            }),
        },
        // Instructions
        Document {
            id: "inst-10-2023".to_string(),
            category: Category::Instructions,
            title: "تعليمات تنفيذية رقم 10 لسنة 2023".to_string(),
            date: "2023-03-15".to_string(),
            description: Some("بشأن أسس المحاسبة الضريبية لنشاط الصيدليات.".to_string()),
            content: "نظراً لما تلاحظ من اختلاف في أسس المحاسبة... يتم اتباع الآتي: تحديد رقم الأعمال بناءً على المسحوبات...".to_string(),
            tags: Some(vec!["صيدليات".to_string(), "تجاري".to_string()]),
            location: None,
        },
        Document {
            id: "book-5-2024".to_string(),
            category: Category::Instructions,
            title: "كتاب دوري رقم 5 لسنة 2024".to_string(),
            date: "2024-02-10".to_string(),
            description: Some("بشأن منظومة الفاتورة الإلكترونية.".to_string()),
            content: "يجب على جميع المسجلين الالتزام بإصدار فواتير إلكترونية...".to_string(),
            tags: Some(vec!["فاتورة إلكترونية".to_string(), "إلزام".to_string()]),
            location: None,
        },
        // Decisions
        Document {
            id: "court-cass-155".to_string(),
            category: Category::Decisions,
            title: "حكم محكمة النقض رقم 155 لسنة 80 ق".to_string(),
            date: "2015-11-20".to_string(),
            description: Some("مبدأ هام بشأن تقادم دين الضريبة.".to_string()),
            content: "قضت المحكمة بأن مدة التقادم خمس سنوات تبدأ من تاريخ...".to_string(),
            tags: Some(vec!["تقادم".to_string(), "نقض".to_string()]),
            location: None,
        },
        // Fatwas
        Document {
            id: "fatwa-export".to_string(),
            category: Category::Fatwas,
            title: "فتوى بشأن ضريبة القيمة المضافة على التصدير".to_string(),
            date: "2023-07-01".to_string(),
            description: Some("مدى خضوع خدمات التصدير للضريبة بسعر صفر.".to_string()),
            content: "انتهى الرأي إلى أن الخدمات المؤداة لمستفيد بالخارج تخضع لسعر صفر...".to_string(),
            tags: Some(vec!["قيمة مضافة".to_string(), "تصدير".to_string()]),
            location: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_ids_are_unique() {
        let docs = seed_documents();
        let ids: HashSet<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), docs.len());
    }

    #[test]
    fn test_every_category_is_configured() {
        for category in Category::ALL {
            assert_eq!(category_config(category).id, category);
        }
    }

    #[test]
    fn test_seed_covers_every_category() {
        let docs = seed_documents();
        for category in Category::ALL {
            assert!(docs.iter().any(|d| d.category == category));
        }
    }

    #[test]
    fn test_location_documents_carry_location_data() {
        for doc in seed_documents() {
            if doc.category == Category::Locations {
                assert!(doc.location.is_some());
            } else {
                assert!(doc.location.is_none());
            }
        }
    }
}
