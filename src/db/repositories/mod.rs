mod training_sessions;
