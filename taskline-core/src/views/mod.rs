//! Pure view engines over loaded state: filtering and ordering, Gantt
//! timeline layout, and person/project groupings.

pub mod gantt;
pub mod groups;
pub mod sort;
