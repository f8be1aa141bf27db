pub use super::product::Entity as Products;
pub use super::seller::Entity as Sellers;
