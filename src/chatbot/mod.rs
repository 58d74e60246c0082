//! Rule-based shop assistant used when the remote chat service is not
//! configured or does not answer.

mod remote;

pub use remote::ChatService;

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{Brand, Product, ProductId};

const MAX_PRODUCT_HITS: usize = 5;
const MAX_BRANDS_LISTED: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Greeting,
    Hours,
    Location,
    Contact,
    Delivery,
    Payment,
    Offers,
    Returns,
    Signup,
    Farewell,
    Product,
    Brand,
}

/// Checked top to bottom; the first intent with a matching keyword wins.
static KEYWORDS: &[(Intent, &[&str])] = &[
    (
        Intent::Greeting,
        &["hola", "buenos dias", "buenas tardes", "buenas noches", "hey", "hi", "hello", "saludos"],
    ),
    (
        Intent::Hours,
        &["horario", "hora", "abierto", "cerrado", "atienden", "abren", "cierran", "cuando"],
    ),
    (
        Intent::Location,
        &["donde", "ubicacion", "direccion", "sucursal", "local", "tienda", "encuentro"],
    ),
    (
        Intent::Contact,
        &["telefono", "llamar", "contacto", "whatsapp", "email", "correo", "numero"],
    ),
    (
        Intent::Delivery,
        &["envio", "delivery", "domicilio", "entregan", "llevan", "pedido", "enviar"],
    ),
    (
        Intent::Payment,
        &["pago", "pagar", "tarjeta", "efectivo", "qr", "transferencia", "aceptan", "forma de pago"],
    ),
    (
        Intent::Offers,
        &["oferta", "descuento", "promocion", "barato", "precio", "rebaja", "ahorro"],
    ),
    (
        Intent::Returns,
        &["devolucion", "devolver", "cambio", "reclamo", "garantia", "reembolso"],
    ),
    (
        Intent::Signup,
        &["registrar", "cuenta", "usuario", "inscribir", "crear cuenta", "registrarse"],
    ),
    (
        Intent::Farewell,
        &["gracias", "adios", "chao", "bye", "hasta luego", "nos vemos"],
    ),
    (
        Intent::Product,
        &["producto", "tienen", "hay", "busco", "necesito", "venden", "stock"],
    ),
    (Intent::Brand, &["marca", "marcas"]),
];

static GREETINGS: &[&str] = &[
    "¡Hola! 👋 Bienvenido a SuperMarket Express. ¿En qué puedo ayudarte hoy?",
    "¡Hola! Soy el asistente virtual de SuperMarket Express. ¿Qué necesitas?",
];

static FAREWELLS: &[&str] = &[
    "¡Gracias por tu visita! Si necesitas algo más, estaré aquí. 😊",
    "¡Hasta pronto! Fue un placer ayudarte. 🛒",
];

const HELP: &str = "🤔 No estoy seguro de entender tu pregunta. Puedo ayudarte con:\n\n\
• Horarios de atención\n• Ubicación de sucursales\n• Información de contacto\n\
• Envíos a domicilio\n• Formas de pago\n• Ofertas y promociones\n• Búsqueda de productos\n\n\
¿Sobre qué te gustaría saber?";

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub rol: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Remote,
    Local,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub source: ReplySource,
}

/// Catalogue data the local rules can answer from.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    pub products: &'a [Product],
    pub brands: &'a [Brand],
}

// ── Intent detection ──────────────────────────────────────────────────────────

/// Lower-cases and strips diacritics from accented Latin letters so
/// "Ubicación" matches "ubicacion". Letters outside the fold table are kept
/// as they are.
pub fn normalize(message: &str) -> String {
    message
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
            'ç' | 'ć' | 'č' => 'c',
            'é' | 'è' | 'ë' | 'ê' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
            'í' | 'ì' | 'ï' | 'î' | 'ī' | 'į' => 'i',
            'ñ' | 'ń' | 'ň' => 'n',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' | 'ō' | 'ő' => 'o',
            'š' | 'ś' => 's',
            'ú' | 'ù' | 'ü' | 'û' | 'ū' | 'ů' | 'ű' => 'u',
            'ý' | 'ÿ' => 'y',
            'ž' | 'ź' | 'ż' => 'z',
            other => other,
        })
        .collect()
}

pub fn detect_intent(message: &str) -> Option<Intent> {
    let msg = normalize(message);
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| msg.contains(w)))
        .map(|(intent, _)| *intent)
}

fn keywords_of(intent: Intent) -> &'static [&'static str] {
    KEYWORDS
        .iter()
        .find(|(i, _)| *i == intent)
        .map(|(_, words)| *words)
        .unwrap_or(&[])
}

// ── Replies ───────────────────────────────────────────────────────────────────

fn canned_reply(intent: Intent, rng: &mut impl Rng) -> &'static str {
    match intent {
        Intent::Greeting => GREETINGS.choose(rng).copied().unwrap_or(GREETINGS[0]),
        Intent::Farewell => FAREWELLS.choose(rng).copied().unwrap_or(FAREWELLS[0]),
        Intent::Hours => "🕐 Nuestros horarios son:\n• Lunes a Sábado: 7:00 - 21:00\n• Domingos: 8:00 - 14:00",
        Intent::Location => "📍 Puedes encontrarnos en nuestras sucursales. ¡Visita la sección de Sucursales para ver todas las direcciones!",
        Intent::Contact => "📞 Puedes contactarnos:\n• Teléfono: +591 2 2411234\n• WhatsApp: +591 70012345\n• Email: contacto@supermarketexpress.com",
        Intent::Delivery => "🚚 ¡Envío GRATIS en compras mayores a Bs. 200! Entregamos el mismo día en zonas cercanas.",
        Intent::Payment => "💳 Aceptamos:\n• Efectivo\n• Tarjetas de débito y crédito\n• QR\n• Transferencia bancaria",
        Intent::Offers => "🔥 Tenemos ofertas todos los días. ¡Revisa nuestra sección de Ofertas para ver los mejores descuentos!",
        Intent::Returns => "↩️ Aceptamos devoluciones dentro de los 7 días con el ticket de compra. Los productos deben estar en su empaque original.",
        Intent::Signup => "📝 Para registrarte, haz clic en el botón 'Registrarse' en la parte superior. ¡Es gratis y obtienes un cupón de Bs. 50!",
        Intent::Product | Intent::Brand => HELP,
    }
}

/// Products whose name or description contains any significant word of the
/// message, deduplicated by id in first-hit order.
pub fn search_products<'a>(message: &str, products: &'a [Product]) -> Vec<&'a Product> {
    let skip = keywords_of(Intent::Product);
    let mut hits: IndexMap<ProductId, &Product> = IndexMap::new();

    for word in message.to_lowercase().split_whitespace() {
        let word = word.trim_matches(|c: char| !c.is_alphanumeric());
        if word.chars().count() <= 3 || skip.contains(&word) {
            continue;
        }
        for p in products.iter().filter(|p| p.matches(word)) {
            hits.entry(p.id).or_insert(p);
        }
    }

    hits.into_values().collect()
}

fn product_reply(message: &str, products: &[Product]) -> String {
    let found = search_products(message, products);
    if found.is_empty() {
        return format!(
            "🔍 No encontré productos específicos. Tenemos {} productos disponibles. ¿Podrías ser más específico?",
            products.len()
        );
    }
    let list = found
        .iter()
        .take(MAX_PRODUCT_HITS)
        .map(|p| format!("• {}", p.name))
        .collect::<Vec<_>>()
        .join("\n");
    format!("🛒 Encontré estos productos:\n{list}\n\n¿Te gustaría saber más sobre alguno?")
}

fn brand_reply(brands: &[Brand]) -> String {
    if brands.is_empty() {
        return "🏷️ Tenemos una gran variedad de marcas. ¡Visita nuestra tienda para conocerlas todas!".to_string();
    }
    let list = brands
        .iter()
        .take(MAX_BRANDS_LISTED)
        .map(|b| format!("• {}", b.name))
        .collect::<Vec<_>>()
        .join("\n");
    let more = if brands.len() > MAX_BRANDS_LISTED {
        format!("\n\n...y {} más!", brands.len() - MAX_BRANDS_LISTED)
    } else {
        String::new()
    };
    format!("🏷️ Trabajamos con estas marcas:\n{list}{more}")
}

/// Answers a message from the keyword rules alone.
pub fn local_reply(message: &str, catalog: Catalog<'_>, rng: &mut impl Rng) -> String {
    match detect_intent(message) {
        Some(Intent::Product) => product_reply(message, catalog.products),
        Some(Intent::Brand) => brand_reply(catalog.brands),
        Some(intent) => canned_reply(intent, rng).to_string(),
        None => HELP.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::models::BrandId;

    fn product(id: i64, name: &str, description: &str) -> Product {
        Product {
            id: ProductId(id),
            name: name.to_string(),
            brand_id: BrandId(1),
            description: description.to_string(),
            active: true,
        }
    }

    fn brand(id: i64, name: &str) -> Brand {
        Brand {
            id: BrandId(id),
            name: name.to_string(),
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    // ── detect_intent ──────────────────────────────────────────────────────────

    #[test]
    fn detects_simple_intents() {
        assert_eq!(detect_intent("¿Cuál es el horario?"), Some(Intent::Hours));
        assert_eq!(detect_intent("Aceptan tarjeta?"), Some(Intent::Payment));
        assert_eq!(detect_intent("quiero hacer un reclamo"), Some(Intent::Returns));
        assert_eq!(detect_intent("muchas gracias"), Some(Intent::Farewell));
    }

    #[test]
    fn detection_ignores_accents_and_case() {
        assert_eq!(detect_intent("UBICACIÓN por favor"), Some(Intent::Location));
        assert_eq!(detect_intent("¿Hacen envío?"), Some(Intent::Delivery));
        assert_eq!(detect_intent("Promoción del día"), Some(Intent::Offers));
    }

    #[test]
    fn first_matching_intent_in_table_order_wins() {
        // "hola" (greeting) precedes "tienen" (product)
        assert_eq!(detect_intent("hola, tienen leche?"), Some(Intent::Greeting));
        // "marcas" contains no earlier keyword, so it falls through to brand
        assert_eq!(detect_intent("que marcas trabajan"), Some(Intent::Brand));
    }

    #[test]
    fn unknown_message_has_no_intent() {
        assert_eq!(detect_intent("xyz"), None);
        assert_eq!(detect_intent(""), None);
    }

    #[test]
    fn normalize_folds_diacritics() {
        assert_eq!(normalize("Añejo ÁÉÍÓÚ"), "anejo aeiou");
    }

    #[test]
    fn normalize_folds_latin_letters_beyond_spanish() {
        assert_eq!(normalize("Açúcar São Ñandú"), "acucar sao nandu");
        assert_eq!(normalize("Crème Brûlée Õ Ÿ"), "creme brulee o y");
    }

    // ── product search ─────────────────────────────────────────────────────────

    #[test]
    fn search_matches_significant_words_and_dedups() {
        let products = vec![
            product(1, "Leche Entera", "bolsa de 1 litro"),
            product(2, "Yogurt de frutilla", "bebible, con leche descremada"),
            product(3, "Arroz", "grano largo"),
        ];
        let hits = search_products("necesito leche entera", &products);
        let ids: Vec<ProductId> = hits.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![ProductId(1), ProductId(2)]);
    }

    #[test]
    fn search_skips_short_words_and_keywords() {
        let products = vec![product(1, "Necesito", ""), product(2, "Sal", "")];
        assert!(search_products("necesito sal", &products).is_empty());
    }

    #[test]
    fn product_reply_lists_at_most_five() {
        let products: Vec<Product> = (1..=8).map(|i| product(i, &format!("Galleta {i}"), "")).collect();
        let reply = local_reply("tienen galletas?", Catalog { products: &products, brands: &[] }, &mut rng());
        // "galletas?" trims to "galletas", which no name contains
        assert!(reply.contains("8 productos"));

        let reply = local_reply("tienen galleta", Catalog { products: &products, brands: &[] }, &mut rng());
        assert_eq!(reply.matches("• ").count(), 5);
    }

    // ── replies ────────────────────────────────────────────────────────────────

    #[test]
    fn brand_reply_truncates_after_eight() {
        let brands: Vec<Brand> = (1..=10).map(|i| brand(i, &format!("Marca {i}"))).collect();
        let reply = local_reply("que marcas trabajan", Catalog { products: &[], brands: &brands }, &mut rng());
        assert!(reply.contains("• Marca 8"));
        assert!(!reply.contains("• Marca 9"));
        assert!(reply.contains("...y 2 más!"));
    }

    #[test]
    fn brand_reply_without_brands() {
        let reply = local_reply("marcas", Catalog { products: &[], brands: &[] }, &mut rng());
        assert!(reply.contains("gran variedad de marcas"));
    }

    #[test]
    fn greeting_picks_one_of_the_variants() {
        let reply = local_reply("hola", Catalog { products: &[], brands: &[] }, &mut rng());
        assert!(GREETINGS.contains(&reply.as_str()));
    }

    #[test]
    fn unknown_message_gets_help() {
        let reply = local_reply("xyz", Catalog { products: &[], brands: &[] }, &mut rng());
        assert_eq!(reply, HELP);
    }
}
