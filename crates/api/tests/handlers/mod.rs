mod admin_test;
mod appointments_test;
mod auth_test;
mod availability_test;
mod catalog_test;
