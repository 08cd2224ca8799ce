pub mod cache;
pub mod field_order;
pub mod html_order;

pub use cache::{cached_field_order, invalidate_field_order};
pub use field_order::{load_field_order, parse_field_order_json, parse_field_order_xlsx};
pub use html_order::{load_html_layout, parse_html_layout};
