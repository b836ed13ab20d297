mod setup;

pub use setup::TestContext;
