mod common;
mod estimate;
mod routing;
