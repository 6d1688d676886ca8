mod close;
mod metadata;
