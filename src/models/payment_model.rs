use serde::Serialize;

pub const NEED_PRICING: &str = "Need Pricing - Click Here";
pub const PRICING_AFTER_WORK: &str = "Submit Pricing after Work Completed";

/// How a ticket's cost is determined and confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PaymentModel {
    FixedConfirmed,
    FixedNotConfirmed,
    OpenEnded,
    SchedulePay,
    Other(String),
}

/// What the pricing link says for a payment model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingLabel {
    /// The confirmed amount, as text.
    ConfirmedAmount,
    Literal(&'static str),
    /// Unknown payment models get an empty label.
    Empty,
}

impl PaymentModel {
    /// Every recognized model, in the order the pricing CASE tests them.
    pub const KNOWN: [PaymentModel; 4] = [
        PaymentModel::FixedConfirmed,
        PaymentModel::FixedNotConfirmed,
        PaymentModel::OpenEnded,
        PaymentModel::SchedulePay,
    ];

    /// Exact, case-sensitive match on the warehouse value.
    pub fn parse(s: &str) -> Self {
        match s {
            "Fixed Cost - Vendor Confirmed" => PaymentModel::FixedConfirmed,
            "Fixed Cost - Vendor NOT Confirmed" => PaymentModel::FixedNotConfirmed,
            "Open Ended" => PaymentModel::OpenEnded,
            "Schedule Pay" => PaymentModel::SchedulePay,
            other => PaymentModel::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaymentModel::FixedConfirmed => "Fixed Cost - Vendor Confirmed",
            PaymentModel::FixedNotConfirmed => "Fixed Cost - Vendor NOT Confirmed",
            PaymentModel::OpenEnded => "Open Ended",
            PaymentModel::SchedulePay => "Schedule Pay",
            PaymentModel::Other(s) => s,
        }
    }

    pub fn label_rule(&self) -> PricingLabel {
        match self {
            PaymentModel::FixedConfirmed => PricingLabel::ConfirmedAmount,
            PaymentModel::FixedNotConfirmed => PricingLabel::Literal(NEED_PRICING),
            PaymentModel::OpenEnded | PaymentModel::SchedulePay => {
                PricingLabel::Literal(PRICING_AFTER_WORK)
            }
            PaymentModel::Other(_) => PricingLabel::Empty,
        }
    }

    /// Label shown on the pricing link. Only Fixed-Confirmed looks at the amount.
    pub fn pricing_label(&self, confirmed_amount: Option<&str>) -> String {
        match self.label_rule() {
            PricingLabel::ConfirmedAmount => confirmed_amount.unwrap_or("").to_string(),
            PricingLabel::Literal(s) => s.to_string(),
            PricingLabel::Empty => String::new(),
        }
    }
}
