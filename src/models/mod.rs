//! Data models for Biblio

pub mod book;
pub mod loan;
pub mod notification;
pub mod user;

// Re-export commonly used types
pub use book::{BookCopy, BookRef};
pub use loan::{Loan, LoanDetails, LoanStatus, OpenLoan};
pub use notification::{AllReminders, BorrowerRef, Bucket, LoanNotice, UserNotifications};
pub use user::{Role, User, UserClaims};
