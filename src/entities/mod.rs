//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod asset;
pub mod company;
pub mod home_content;
pub mod invoice;
pub mod invoice_item;
pub mod potm_application;
pub mod potm_month;
pub mod product;
pub mod promotion;
pub mod quote;
pub mod quote_item;
pub mod resource;
pub mod user;

// Re-export specific types to avoid conflicts
pub use asset::{Column as AssetColumn, Entity as Asset, Model as AssetModel};
pub use company::{Column as CompanyColumn, Entity as Company, Model as CompanyModel};
pub use home_content::{
    Column as HomeContentColumn, Entity as HomeContent, Model as HomeContentModel,
};
pub use invoice::{Column as InvoiceColumn, Entity as Invoice, Model as InvoiceModel};
pub use invoice_item::{
    Column as InvoiceItemColumn, Entity as InvoiceItem, Model as InvoiceItemModel,
};
pub use potm_application::{
    ApplicationStatus, Column as PotmApplicationColumn, Entity as PotmApplication,
    Model as PotmApplicationModel,
};
pub use potm_month::{
    Column as PotmMonthColumn, Entity as PotmMonth, Model as PotmMonthModel, MonthStatus,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use promotion::{Column as PromotionColumn, Entity as Promotion, Model as PromotionModel};
pub use quote::{Column as QuoteColumn, Entity as Quote, Model as QuoteModel, QuoteStatus};
pub use quote_item::{Column as QuoteItemColumn, Entity as QuoteItem, Model as QuoteItemModel};
pub use resource::{Column as ResourceColumn, Entity as Resource, Model as ResourceModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
