mod num_enum;
mod print_err;

pub(crate) use num_enum::numeric_enum;
