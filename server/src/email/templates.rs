//! Plain-text bodies for outgoing mail.

use rust_decimal::Decimal;

use crate::util::format_idr;
use crate::volunteers::VolunteerStatus;

/// A rendered message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

/// Volunteer application status update.
pub fn volunteer_status(org: &str, name: &str, status: VolunteerStatus) -> EmailContent {
    match status {
        VolunteerStatus::Pending => EmailContent {
            subject: "Your volunteer application is being reviewed".into(),
            body: format!(
                "Hello {name},\n\
                 \n\
                 Thank you for signing up as a volunteer with {org}.\n\
                 \n\
                 We have received your application and our team is reviewing it.\n\
                 We will contact you soon with more information.\n\
                 \n\
                 Warm regards,\n\
                 The {org} team\n"
            ),
        },
        VolunteerStatus::Approved => EmailContent {
            subject: "Congratulations! Your volunteer application was accepted".into(),
            body: format!(
                "Hello {name},\n\
                 \n\
                 We are happy to let you know that your application to volunteer\n\
                 with {org} has been ACCEPTED.\n\
                 \n\
                 Next steps:\n\
                 - Our team will contact you within 1-2 working days\n\
                 - You will receive details about volunteer orientation\n\
                 \n\
                 Thank you for joining us.\n\
                 \n\
                 Warm regards,\n\
                 The {org} team\n"
            ),
        },
        VolunteerStatus::Rejected => EmailContent {
            subject: "An update on your volunteer application".into(),
            body: format!(
                "Hello {name},\n\
                 \n\
                 Thank you for applying to volunteer with {org}.\n\
                 \n\
                 After careful review we are unable to accept your application at\n\
                 this time. You are welcome to apply again in a future period or to\n\
                 support our programs through a donation.\n\
                 \n\
                 Thank you for your understanding.\n\
                 \n\
                 Warm regards,\n\
                 The {org} team\n"
            ),
        },
    }
}

/// Thank-you note sent after a donation is received.
pub fn donation_thank_you(
    org: &str,
    name: &str,
    amount: &Decimal,
    program_title: Option<&str>,
) -> EmailContent {
    let target = program_title.map_or_else(
        || "General donation".to_string(),
        |title| format!("For: {title}"),
    );
    EmailContent {
        subject: format!("Thank you for your donation to {org}"),
        body: format!(
            "Hello {name},\n\
             \n\
             Thank you for your generous donation to {org}.\n\
             \n\
             Your donation: {amount}\n\
             {target}\n\
             \n\
             We will confirm your donation once the payment has been verified.\n\
             \n\
             Warm regards,\n\
             The {org} team\n",
            amount = format_idr(amount),
        ),
    }
}

/// Automatic acknowledgement of a contact form message.
pub fn contact_acknowledgement(org: &str, name: &str, subject: Option<&str>) -> EmailContent {
    let about = subject.map(|s| format!(" about \"{s}\"")).unwrap_or_default();
    EmailContent {
        subject: format!("We received your message - {org}"),
        body: format!(
            "Hello {name},\n\
             \n\
             Thank you for contacting {org}. We received your message{about}\n\
             and will reply as soon as possible.\n\
             \n\
             Warm regards,\n\
             The {org} team\n"
        ),
    }
}

/// Reply written by an admin to a contact message.
pub fn manual_reply(
    org: &str,
    name: &str,
    subject: &str,
    original_message: &str,
    reply: &str,
) -> EmailContent {
    let quoted: String = original_message
        .lines()
        .map(|line| format!("> {line}\n"))
        .collect();
    EmailContent {
        subject: format!("Re: {subject}"),
        body: format!(
            "Hello {name},\n\
             \n\
             {reply}\n\
             \n\
             Warm regards,\n\
             The {org} team\n\
             \n\
             Your original message:\n\
             {quoted}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_volunteer_subjects_differ_by_status() {
        let pending = volunteer_status("Org", "Ayu", VolunteerStatus::Pending);
        let approved = volunteer_status("Org", "Ayu", VolunteerStatus::Approved);
        let rejected = volunteer_status("Org", "Ayu", VolunteerStatus::Rejected);

        assert_ne!(pending.subject, approved.subject);
        assert_ne!(approved.subject, rejected.subject);
        assert!(approved.body.contains("Hello Ayu"));
        assert!(approved.body.contains("ACCEPTED"));
    }

    #[test]
    fn test_donation_thank_you_formats_amount() {
        let amount = Decimal::from_str("150000.00").unwrap();

        let general = donation_thank_you("Org", "Budi", &amount, None);
        assert!(general.body.contains("Rp 150.000"));
        assert!(general.body.contains("General donation"));

        let program = donation_thank_you("Org", "Budi", &amount, Some("Clean Water"));
        assert!(program.body.contains("For: Clean Water"));
        assert!(!program.body.contains("General donation"));
    }

    #[test]
    fn test_manual_reply_quotes_original() {
        let mail = manual_reply("Org", "Sari", "Partnership", "Line one\nLine two", "Thanks!");
        assert_eq!(mail.subject, "Re: Partnership");
        assert!(mail.body.contains("> Line one\n> Line two\n"));
        assert!(mail.body.contains("Thanks!"));
    }

    #[test]
    fn test_contact_acknowledgement() {
        let with = contact_acknowledgement("Org", "Dewi", Some("Volunteering"));
        assert!(with.body.contains("about \"Volunteering\""));
        let without = contact_acknowledgement("Org", "Dewi", None);
        assert!(without.body.contains("received your message\n"));
    }
}
