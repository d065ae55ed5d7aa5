// Pure per-tick rules, free of entity bookkeeping.

pub mod drive;
