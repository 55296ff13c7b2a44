pub mod visitor_count;

pub use visitor_count::Entity as VisitorCountEntity;
