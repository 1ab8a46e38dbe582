mod blocks;
mod notes;
