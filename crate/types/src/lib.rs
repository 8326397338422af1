pub mod primitive_type;

pub use primitive_type::PrimitiveType;
