mod bookings;
mod common;
mod invoices;
mod jobs;
mod large_projects;
mod organizations;
mod packing_jobs;
mod profiles;
mod projects;
mod user_roles;

pub use bookings::SqliteBookingRepo;
pub use invoices::SqliteInvoiceRepo;
pub use jobs::SqliteJobRepo;
pub use large_projects::SqliteLargeProjectRepo;
pub use organizations::SqliteOrganizationRepo;
pub use packing_jobs::SqlitePackingJobRepo;
pub use profiles::SqliteProfileRepo;
pub use projects::SqliteProjectRepo;
pub use user_roles::SqliteUserRoleRepo;
