pub mod employee;
pub mod vacation_request;
