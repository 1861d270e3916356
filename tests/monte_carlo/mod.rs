mod export;
mod framework;
mod sweep;
