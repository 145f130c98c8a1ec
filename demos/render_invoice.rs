//! Renders a small invoice through a local stand-in for the Forge service.
//!
//! Run with: cargo run --example render_invoice

use std::io::Read;

use forge_sdk::{EmbeddedFile, EmbedRelationship, ForgeClient, OutputFormat, Paper, PdfStandard};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Forge SDK - invoice example\n");

    // Tiny server standing in for the rendering service: echoes the payload size
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let base = format!("http://{}", server.server_addr());
    std::thread::spawn(move || {
        for mut req in server.incoming_requests() {
            let mut body = String::new();
            let _ = req.as_reader().read_to_string(&mut body);
            let reply = format!("%PDF-1.7 stand-in ({} payload bytes)", body.len());
            let _ = req.respond(tiny_http::Response::from_string(reply));
        }
    });

    let client = ForgeClient::new(&base)?;
    println!("health: {}", client.health_blocking());

    let xml = br#"<Invoice><ID>1234</ID></Invoice>"#;
    let pdf = client
        .render_html("<h1>Invoice #1234</h1><p>Total: 42.00 EUR</p>")
        .format(OutputFormat::Pdf)
        .paper(Paper::A4)
        .margins("20,15,20,15")?
        .pdf_title("Invoice #1234")
        .pdf_author("Billing")
        .pdf_bookmarks(true)
        .pdf_standard(PdfStandard::PdfA3b)
        .pdf_watermark_text("DRAFT")
        .pdf_attach(
            EmbeddedFile::new("invoice.xml", xml)
                .mime_type("application/xml")
                .relationship(EmbedRelationship::Alternative),
        )?
        .send_blocking()?;

    println!("received: {}", String::from_utf8_lossy(&pdf));
    client.close();
    Ok(())
}
