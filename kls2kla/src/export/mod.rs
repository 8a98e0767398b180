mod keylayout;

pub use keylayout::{escape_xml, to_keylayout, Keylayout};
