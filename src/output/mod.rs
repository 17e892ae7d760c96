// Output generation module

pub mod builder;
pub mod colors;
pub mod highlight;
pub mod sections;
pub mod templates;

pub use builder::*;
pub use colors::{group_colors, ColorGroup, Swatch};
pub use highlight::highlight_html;
pub use sections::{SectionBody, SectionRenderer};
pub use templates::{html_escape, slugify, TemplateEngine};
