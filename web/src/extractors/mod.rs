pub(crate) mod bearer_session;
