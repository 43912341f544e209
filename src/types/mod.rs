pub mod resume;

pub use resume::{Certification, Education, Experience, Resume, ResumeFields};
