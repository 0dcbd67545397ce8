//! PostgreSQL implementations of the record-store traits.

pub mod alert;
pub mod clinical;
pub mod compliance;
pub mod history;
pub mod location;
pub mod notification;
pub mod push;

pub use alert::AlertRepository;
pub use clinical::ClinicalRepository;
pub use compliance::ComplianceRepository;
pub use history::HistoryRepository;
pub use location::LocationRepository;
pub use notification::NotificationRepository;
pub use push::PushSubscriptionRepository;
