pub mod encode;
pub mod input;
pub mod model;
pub mod render;
pub mod surface;

pub use encode::SignatureImage;
pub use input::PointerSource;
pub use surface::SignaturePad;
