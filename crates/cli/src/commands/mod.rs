pub mod doctor;
pub mod onboard;
pub mod providers;
pub mod run;
