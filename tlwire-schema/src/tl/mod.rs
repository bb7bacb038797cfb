//! The type-expression grammar used by schema parameters.

mod flag;
mod param_type;
mod type_expr;

pub use flag::Flag;
pub use param_type::ParamType;
pub use type_expr::TypeExpr;
