//! Data models for the pharmacy delivery platform

pub mod cart;
pub mod notification;
pub mod order;
pub mod product;

pub use cart::CartEntry;
pub use notification::{Notification, NotificationKind};
pub use order::{
    DeliveryAddress, Order, OrderCreate, OrderItem, OrderStatus, StockChange,
};
pub use product::Product;
