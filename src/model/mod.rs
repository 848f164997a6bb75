pub mod balance;
pub mod employee;
pub mod vacation_request;
