// Declarative rule tables
//
// Every extracted component category is one `CategoryRule`: selectors, key
// derivation, admission filters, caps and wrapper promotion. The classifier
// buckets are one ordered `BucketRule` table over class/id strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Component categories recognized by the analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Buttons,
    Forms,
    Tables,
    Boxes,
    Lists,
    Modals,
    Tabs,
    Pagination,
    Typography,
    Badges,
    Accordions,
    Icons,
}

impl Component {
    pub fn name(self) -> &'static str {
        match self {
            Component::Buttons => "buttons",
            Component::Forms => "forms",
            Component::Tables => "tables",
            Component::Boxes => "boxes",
            Component::Lists => "lists",
            Component::Modals => "modals",
            Component::Tabs => "tabs",
            Component::Pagination => "pagination",
            Component::Typography => "typography",
            Component::Badges => "badges",
            Component::Accordions => "accordions",
            Component::Icons => "icons",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Class fragments used by carousel/slider libraries
pub const CAROUSEL_FRAGMENTS: &[&str] = &[
    "swiper", "slick", "owl-", "bx-", "bxslider", "splide", "flickity", "glide", "carousel",
];

/// Class fragments of page-level wrappers that are never a tab component
pub const WRAPPER_FRAGMENTS: &[&str] = &["contents", "section", "page-", "container", "wrapper"];

/// Tags that are never a button even if their class says so
pub const CONTAINER_TAGS: &[&str] = &[
    "div", "ul", "ol", "li", "section", "article", "nav", "form", "table", "p", "dl",
];

/// Ancestor promotion for categories whose component is wider than the match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    None,
    /// `<div>` parent or grandparent whose class contains a table wrapper name
    TableWrapper,
    /// `<nav>` or paging-class parent or grandparent
    PagingWrapper,
}

/// Extra admission checks beyond the size cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Any,
    /// Reject container tags and anything inside a carousel library
    Button,
    /// Reject hidden/submit/button inputs
    FormControl,
    /// Reject page wrappers and table classes
    Tab,
}

/// Declarative description of one extracted category
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub component: Component,
    /// Class and attribute based selectors
    pub primary: &'static [&'static str],
    /// ARIA role and id based selectors layered on top of the class pass
    pub secondary: &'static [&'static str],
    pub max_samples: usize,
    pub max_html_len: usize,
    pub admission: Admission,
    pub promotion: Promotion,
    /// Reject candidates whose HTML contains, or is contained in, an accepted sample
    pub containment_dedup: bool,
}

/// Maximum characters of text kept with a sample
pub const SAMPLE_TEXT_LEN: usize = 50;

pub const TABLE_WRAPPER_FRAGMENTS: &[&str] = &[
    "table-wrap",
    "table_wrap",
    "tbl-wrap",
    "tbl_wrap",
    "table-responsive",
    "table-box",
    "tbl-box",
    "table-area",
    "tbl-area",
];

pub const PAGING_FRAGMENTS: &[&str] = &["paging", "pagination", "pager"];

/// Extraction rules, one per category
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        component: Component::Buttons,
        primary: &[
            "button",
            "[class*=\"btn\"]",
            "[class*=\"button\"]",
            "input[type=\"submit\"]",
            "input[type=\"button\"]",
        ],
        secondary: &["[role=\"button\"]"],
        max_samples: 12,
        max_html_len: 2_000,
        admission: Admission::Button,
        promotion: Promotion::None,
        containment_dedup: false,
    },
    CategoryRule {
        component: Component::Forms,
        primary: &[
            "input",
            "select",
            "textarea",
            "[class*=\"input\"]",
            "[class*=\"checkbox\"]",
            "[class*=\"radio\"]",
            "[class*=\"select\"]",
        ],
        secondary: &[
            "[role=\"checkbox\"]",
            "[role=\"radio\"]",
            "[role=\"combobox\"]",
            "[role=\"textbox\"]",
        ],
        max_samples: 12,
        max_html_len: 1_500,
        admission: Admission::FormControl,
        promotion: Promotion::None,
        containment_dedup: false,
    },
    CategoryRule {
        component: Component::Tables,
        primary: &["table", "[class*=\"table\"]", "[class*=\"tbl\"]"],
        secondary: &["[role=\"table\"]", "[role=\"grid\"]"],
        max_samples: 5,
        max_html_len: 8_000,
        admission: Admission::Any,
        promotion: Promotion::TableWrapper,
        containment_dedup: false,
    },
    CategoryRule {
        component: Component::Boxes,
        primary: &["[class*=\"box\"]", "[class*=\"card\"]", "[class*=\"panel\"]"],
        secondary: &["[id*=\"box\"]", "[id*=\"card\"]"],
        max_samples: 8,
        max_html_len: 3_000,
        admission: Admission::Any,
        promotion: Promotion::None,
        containment_dedup: false,
    },
    CategoryRule {
        component: Component::Lists,
        primary: &["ul[class]", "ol[class]", "dl[class]", "[class*=\"list\"]"],
        secondary: &["[role=\"list\"]", "[id*=\"list\"]"],
        max_samples: 8,
        max_html_len: 3_000,
        admission: Admission::Any,
        promotion: Promotion::None,
        containment_dedup: false,
    },
    CategoryRule {
        component: Component::Modals,
        primary: &[
            "dialog",
            "[class*=\"modal\"]",
            "[class*=\"popup\"]",
            "[class*=\"layer\"]",
            "[class*=\"dialog\"]",
        ],
        secondary: &[
            "[role=\"dialog\"]",
            "[role=\"alertdialog\"]",
            "[id*=\"modal\"]",
            "[id*=\"popup\"]",
            "[id*=\"layer\"]",
        ],
        max_samples: 6,
        max_html_len: 6_000,
        admission: Admission::Any,
        promotion: Promotion::None,
        containment_dedup: false,
    },
    CategoryRule {
        component: Component::Tabs,
        primary: &[
            "[class*=\"tab-\"]",
            "[class*=\"tab_\"]",
            "[class*=\"tabs\"]",
            "[class*=\"tablist\"]",
            "[class~=\"tab\"]",
        ],
        secondary: &["[role=\"tablist\"]", "[id*=\"tab\"]"],
        max_samples: 6,
        max_html_len: 4_000,
        admission: Admission::Tab,
        promotion: Promotion::None,
        containment_dedup: false,
    },
    CategoryRule {
        component: Component::Pagination,
        primary: &[
            "[class*=\"pagination\"]",
            "[class*=\"paging\"]",
            "[class*=\"pager\"]",
            "[class*=\"page-nav\"]",
        ],
        secondary: &["nav[aria-label*=\"pag\"]", "[id*=\"paging\"]", "[id*=\"pagination\"]"],
        max_samples: 4,
        max_html_len: 3_000,
        admission: Admission::Any,
        promotion: Promotion::PagingWrapper,
        containment_dedup: true,
    },
    CategoryRule {
        component: Component::Badges,
        primary: &[
            "[class*=\"badge\"]",
            "[class*=\"chip\"]",
            "[class*=\"tag-\"]",
            "[class*=\"label-\"]",
        ],
        secondary: &["[role=\"status\"]", "[id*=\"badge\"]"],
        max_samples: 12,
        max_html_len: 500,
        admission: Admission::Any,
        promotion: Promotion::None,
        containment_dedup: false,
    },
    CategoryRule {
        component: Component::Accordions,
        primary: &[
            "details",
            "[class*=\"accordion\"]",
            "[class*=\"collapse\"]",
            "[class*=\"faq\"]",
            "[class*=\"fold\"]",
        ],
        secondary: &["[id*=\"accordion\"]", "[id*=\"faq\"]"],
        max_samples: 4,
        max_html_len: 5_000,
        admission: Admission::Any,
        promotion: Promotion::None,
        containment_dedup: false,
    },
    CategoryRule {
        component: Component::Icons,
        primary: &[
            "i[class]",
            "[class*=\"ico\"]",
            "[class*=\"material-icons\"]",
            "[class*=\"material-symbols\"]",
        ],
        secondary: &["[role=\"img\"][class]"],
        max_samples: 24,
        max_html_len: 1_500,
        admission: Admission::Any,
        promotion: Promotion::None,
        containment_dedup: false,
    },
];

/// Find the extraction rule for a component
pub fn category_rule(component: Component) -> Option<&'static CategoryRule> {
    CATEGORY_RULES.iter().find(|rule| rule.component == component)
}

/// Typography candidates inside the chosen scope
pub const TYPOGRAPHY_SELECTORS: &[&str] = &[
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "[class*=\"title\"]",
    "[class*=\"tit\"]",
    "[class*=\"heading\"]",
    "[class*=\"headline\"]",
    "[class*=\"subject\"]",
    "[id*=\"title\"]",
];

/// Scope selectors tried in order; the first one present wins
pub const TYPOGRAPHY_SCOPES: &[&str] = &["main", ".contents"];

pub const MAX_TYPOGRAPHY_ENTRIES: usize = 40;

/// Substring rule mapping a class or id to a component bucket
#[derive(Debug, Clone, Copy)]
pub struct BucketRule {
    pub component: Component,
    pub include: &'static [&'static str],
    pub exclude: &'static [&'static str],
}

impl BucketRule {
    /// Whether a lowercased class or id belongs to this bucket
    pub fn matches(&self, name: &str) -> bool {
        self.include.iter().any(|frag| name.contains(frag))
            && !self.exclude.iter().any(|frag| name.contains(frag))
    }
}

/// Classifier rules, evaluated in order for every class and id
pub const BUCKET_RULES: &[BucketRule] = &[
    BucketRule {
        component: Component::Buttons,
        include: &["btn", "button"],
        exclude: CAROUSEL_FRAGMENTS,
    },
    BucketRule {
        component: Component::Forms,
        include: &["form", "input", "select", "checkbox", "radio", "textarea"],
        exclude: &["selected"],
    },
    BucketRule {
        component: Component::Tables,
        include: &["table", "tbl"],
        exclude: &[],
    },
    BucketRule {
        component: Component::Boxes,
        include: &["box", "card", "panel"],
        exclude: &["checkbox"],
    },
    BucketRule {
        component: Component::Lists,
        include: &["list"],
        exclude: &["tablist"],
    },
    BucketRule {
        component: Component::Modals,
        include: &["modal", "popup", "layer", "dialog"],
        exclude: &[],
    },
    BucketRule {
        component: Component::Tabs,
        include: &["tab"],
        exclude: &["table", "tbl", "tablet"],
    },
    BucketRule {
        component: Component::Pagination,
        include: &["paging", "pagination", "pager"],
        exclude: &[],
    },
    BucketRule {
        component: Component::Badges,
        include: &["badge", "chip", "tag-", "label-"],
        exclude: &[],
    },
    BucketRule {
        component: Component::Accordions,
        include: &["accordion", "collapse", "faq", "fold"],
        exclude: &[],
    },
    BucketRule {
        component: Component::Icons,
        include: &["ico", "material-icons", "material-symbols"],
        exclude: &[],
    },
];

/// Find the bucket rule for a component
pub fn bucket_rule(component: Component) -> Option<&'static BucketRule> {
    BUCKET_RULES.iter().find(|rule| rule.component == component)
}

/// Whether a class attribute mentions a carousel library
pub fn is_carousel_class(class: &str) -> bool {
    let lower = class.to_ascii_lowercase();
    CAROUSEL_FRAGMENTS.iter().any(|frag| lower.contains(frag))
}

/// Whether a class token looks like an icon class
pub fn is_icon_class(class: &str) -> bool {
    let lower = class.to_ascii_lowercase();
    lower.contains("ico")
        || lower.starts_with("fa-")
        || lower == "fa"
        || lower == "fas"
        || lower == "far"
        || lower.starts_with("material-")
        || lower.starts_with("bi-")
        || lower.starts_with("xi-")
}
