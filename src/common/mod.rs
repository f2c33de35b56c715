pub mod coral_image;

pub use coral_image::{display_name, CoralImage};
