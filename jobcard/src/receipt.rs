//! Everything needed to print a job receipt.
use serde::Serialize;

use crate::{
    billing::{Breakdown, Currency},
    job::Job,
    settings::ShopSettings,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub shop: ShopSettings,
    pub job: Job,
    pub breakdown: Breakdown,
}

impl Receipt {
    pub fn new(shop: ShopSettings, job: Job) -> Self {
        let breakdown = job.breakdown();
        Self {
            shop,
            job,
            breakdown,
        }
    }

    /// A plain text rendering of the receipt.
    pub fn render(&self, currency: &Currency) -> String {
        let mut lines = vec![self.shop.name.clone()];
        lines.extend(
            [&self.shop.address, &self.shop.phone]
                .into_iter()
                .filter(|line| !line.is_empty())
                .cloned(),
        );
        lines.push(String::new());
        lines.push(format!("Job: {}", self.job.id));
        lines.push(format!("Status: {}", self.job.status));
        lines.push(format!(
            "Customer: {} {}",
            self.job.customer.name, self.job.customer.phone
        ));
        if let Some(item) = self.job.item.summary() {
            lines.push(format!("Item: {item}"));
        }
        if !self.job.issue.is_empty() {
            lines.push(format!("Issue: {}", self.job.issue));
        }
        if !self.job.accessories.is_empty() {
            lines.push(format!("Accessories: {}", self.job.accessories));
        }
        lines.push(String::new());
        lines.push(format!(
            "Estimate: {}",
            currency.format(self.breakdown.subtotal)
        ));
        lines.push(format!(
            "Tax ({}%): {}",
            self.breakdown.tax_percent,
            currency.format(self.breakdown.tax)
        ));
        lines.push(format!(
            "Total: {}",
            currency.format(self.breakdown.grand_total)
        ));
        lines.push(format!(
            "Advance: {}",
            currency.format(self.breakdown.advance)
        ));
        lines.push(format!(
            "Balance: {}",
            currency.format(self.breakdown.balance)
        ));
        if let Some(payment_mode) = &self.job.billing.payment_mode {
            lines.push(format!(
                "Paid: {} by {payment_mode}",
                currency.format(self.job.billing.final_amount)
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::job::PaymentMode;

    #[test]
    fn receipt_carries_the_estimate() {
        let receipt = Receipt::new(ShopSettings::default(), Job::raw_job());

        assert_eq!(receipt.breakdown.grand_total, 440.0);
        assert_eq!(receipt.breakdown.balance, 240.0);
    }

    #[test]
    fn render() {
        let mut job = Job::raw_job();
        job.mark_picked_up(500.0, PaymentMode::Card, job.created_at);
        let receipt = Receipt::new(ShopSettings::new("FixIt", "", "0800"), job);

        let text = receipt.render(&Currency::default());

        assert!(text.starts_with("FixIt\n0800\n"));
        assert!(text.contains("Job: 20240115-001"));
        assert!(text.contains("Status: Picked-Up"));
        assert!(text.contains("Item: Phone · Nokia · 3310"));
        assert!(text.contains("Tax (10%): ₹40.00"));
        assert!(text.contains("Balance: ₹240.00"));
        assert!(text.ends_with("Paid: ₹500.00 by Card"));
    }
}
