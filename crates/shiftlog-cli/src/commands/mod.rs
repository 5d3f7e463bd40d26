pub mod entries;
pub mod init;
pub mod maintenance;
pub mod misc;
pub mod references;
pub mod reports;
pub mod session;

pub use entries::{handle_activate, handle_add, handle_cancel, handle_list, handle_show};
pub use init::handle_init;
pub use maintenance::handle_check;
pub use misc::handle_completions;
pub use references::{handle_category, handle_equipment, handle_location};
pub use reports::{handle_report, handle_stats};
pub use session::{handle_login, handle_logout, handle_whoami};
