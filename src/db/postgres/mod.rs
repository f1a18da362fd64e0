mod bookings;
mod invoices;
mod jobs;
mod large_projects;
mod organizations;
mod packing_jobs;
mod profiles;
mod projects;
mod user_roles;

pub use bookings::PostgresBookingRepo;
pub use invoices::PostgresInvoiceRepo;
pub use jobs::PostgresJobRepo;
pub use large_projects::PostgresLargeProjectRepo;
pub use organizations::PostgresOrganizationRepo;
pub use packing_jobs::PostgresPackingJobRepo;
pub use profiles::PostgresProfileRepo;
pub use projects::PostgresProjectRepo;
pub use user_roles::PostgresUserRoleRepo;
