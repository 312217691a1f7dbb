pub mod telegram;
pub mod vendor_page;
