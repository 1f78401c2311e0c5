use serde::{Deserialize, Serialize};

use crate::error::{CartError, Operation};

/// User-facing failure messages.
///
/// One message per failed operation, plus a dedicated message for requests
/// that exceed the available stock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Messages {
    pub addition_failed: String,
    pub removal_failed: String,
    pub stock_exceeded: String,
    pub quantity_change_failed: String,
}

impl Messages {
    pub fn english() -> Self {
        Self {
            addition_failed: "addition failed".into(),
            removal_failed: "removal failed".into(),
            stock_exceeded: "requested quantity exceeds stock".into(),
            quantity_change_failed: "quantity change failed".into(),
        }
    }

    pub fn pt_br() -> Self {
        Self {
            addition_failed: "Erro na adição do produto".into(),
            removal_failed: "Erro na remoção do produto".into(),
            stock_exceeded: "Quantidade solicitada fora de estoque".into(),
            quantity_change_failed: "Erro na alteração de quantidade do produto".into(),
        }
    }

    /// Generic failure message for an operation.
    pub fn for_operation(&self, operation: Operation) -> &str {
        match operation {
            Operation::Add => &self.addition_failed,
            Operation::Remove | Operation::Clear => &self.removal_failed,
            Operation::UpdateAmount => &self.quantity_change_failed,
        }
    }

    /// The message reported to the user for `error`.
    pub fn for_error(&self, error: &CartError) -> &str {
        if error.is_stock_exceeded() {
            &self.stock_exceeded
        } else {
            self.for_operation(error.operation())
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::english()
    }
}
