pub mod dashboard;
pub mod invoice;
pub mod money;
pub mod provider;
pub mod registration;
pub mod user;

pub use dashboard::{DashboardMetrics, RecentActivity, ReportType};
pub use invoice::{Complement, Currency, Invoice, InvoiceStatus};
pub use provider::{Provider, ProviderStatus};
pub use registration::{CompanyRegistration, RegisterForm, VendorRegistration};
pub use user::{AuthUser, BackendUser, ManagedUser, SessionUser};
