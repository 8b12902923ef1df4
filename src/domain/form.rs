use serde::Serialize;

/// Hidden fields of the redirect form that sends the payer to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentForm {
    #[serde(rename = "MERCHANT_ID")]
    pub merchant_id: String,
    /// Amount in cents, without a decimal point.
    #[serde(rename = "AMOUNT")]
    pub amount: String,
    #[serde(rename = "CURRENCY")]
    pub currency: String,
    #[serde(rename = "ORDER_NUMBER")]
    pub order_number: String,
    #[serde(rename = "LANG")]
    pub language: String,
    #[serde(rename = "RETURN_ADDRESS")]
    pub return_address: String,
    #[serde(rename = "CANCEL_ADDRESS")]
    pub cancel_address: String,
    #[serde(rename = "AUTHCODE")]
    pub authcode: String,
}

impl PaymentForm {
    /// Field name/value pairs in the order the gateway documents them.
    pub fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("MERCHANT_ID", self.merchant_id.as_str()),
            ("AMOUNT", self.amount.as_str()),
            ("CURRENCY", self.currency.as_str()),
            ("ORDER_NUMBER", self.order_number.as_str()),
            ("LANG", self.language.as_str()),
            ("RETURN_ADDRESS", self.return_address.as_str()),
            ("CANCEL_ADDRESS", self.cancel_address.as_str()),
            ("AUTHCODE", self.authcode.as_str()),
        ]
    }
}
