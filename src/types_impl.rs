pub(crate) mod daydate;
pub(crate) mod daytime;
pub(crate) mod decimal;
pub(crate) mod timestamp;
