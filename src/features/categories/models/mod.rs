mod category;

pub use category::ServiceCategory;
