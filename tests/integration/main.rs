mod lifecycle;
mod mock_providers;
