mod create_superuser;

pub use create_superuser::create_superuser_command;
