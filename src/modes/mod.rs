pub mod site;

pub use site::{Accent, SiteMode, SiteOptions};
