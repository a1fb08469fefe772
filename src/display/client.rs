//! Client display formatting
//!
//! Formats clients for terminal output in table and detail views.

use crate::models::{Appointment, Client, Measurement, Money, Payment, Service};

/// Format a list of clients as a table
pub fn format_client_list(clients: &[Client]) -> String {
    if clients.is_empty() {
        return "No clients found.".to_string();
    }

    let name_width = clients
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<12}  {:<16}  {}\n",
        "Name",
        "ID",
        "Phone",
        "Status",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<12}  {:-<16}  {:-<8}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for client in clients {
        output.push_str(&format!(
            "{:<name_width$}  {:<12}  {:<16}  {}\n",
            client.name,
            client.id.to_string(),
            client.phone,
            if client.archived { "Archived" } else { "" },
            name_width = name_width,
        ));
    }

    output
}

/// Format a single client's details with their packages and balance
pub fn format_client_details(
    client: &Client,
    services: &[Service],
    payments: &[Payment],
    appointments: &[Appointment],
    measurements: &[Measurement],
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Client: {}\n", client.name));
    output.push_str(&format!("  ID:             {}\n", client.id));
    if !client.phone.is_empty() {
        output.push_str(&format!("  Phone:          {}\n", client.phone));
    }
    if let Some(email) = &client.email {
        output.push_str(&format!("  Email:          {}\n", email));
    }
    if client.archived {
        output.push_str("  Status:         Archived\n");
    }
    if !client.notes.is_empty() {
        output.push_str(&format!("  Notes:          {}\n", client.notes));
    }
    output.push_str(&format!(
        "  Registered:     {}\n",
        client.created_at.format("%Y-%m-%d")
    ));

    if !services.is_empty() {
        output.push_str("\nPackages:\n");
        for service in services {
            output.push_str(&format!(
                "  {}  {}  {}/{} sessions left\n",
                service.id,
                service.name,
                service.remaining_sessions,
                service.total_sessions,
            ));
        }
    }

    let total_due: Money = services.iter().map(|s| s.total_price).sum();
    let total_paid: Money = payments.iter().map(|p| p.amount).sum();
    output.push_str(&format!("\n  Total packages: {}\n", total_due));
    output.push_str(&format!("  Total paid:     {}\n", total_paid));
    output.push_str(&format!("  Balance:        {}\n", total_due - total_paid));

    let upcoming = appointments
        .iter()
        .filter(|a| a.status == crate::models::AppointmentStatus::Scheduled)
        .count();
    if upcoming > 0 {
        output.push_str(&format!("\n  Upcoming appointments: {}\n", upcoming));
    }

    if let Some(last) = measurements.iter().max_by_key(|m| m.date) {
        if let Some(weight) = last.weight_kg {
            output.push_str(&format!(
                "  Last weight:    {:.1} kg ({})\n",
                weight, last.date
            ));
        }
        if let Some(bmi) = last.bmi() {
            output.push_str(&format!("  BMI:            {:.1}\n", bmi));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list() {
        assert_eq!(format_client_list(&[]), "No clients found.");
    }

    #[test]
    fn test_list_shows_archived_marker() {
        let mut client = Client::new("Ayşe");
        client.archived = true;
        let output = format_client_list(&[client]);
        assert!(output.contains("Ayşe"));
        assert!(output.contains("Archived"));
    }

    #[test]
    fn test_details_balance() {
        let client = Client::new("Mehmet");
        let service = Service::new(
            client.id,
            "Diet plan",
            Money::from_units(1000),
            5,
            chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        let payment = Payment::new(
            client.id,
            Money::from_units(400),
            crate::models::PaymentMethod::Cash,
            chrono::NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        );

        let output = format_client_details(&client, &[service], &[payment], &[], &[]);
        assert!(output.contains("Balance:"));
        assert!(output.contains("600.00"));
    }
}
