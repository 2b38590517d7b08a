//! Cuban provinces, their municipalities and property addresses.

use serde::{Deserialize, Serialize};

/// One of the sixteen Cuban provinces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Province {
    #[serde(rename = "Pinar del Río")]
    PinarDelRio,
    #[serde(rename = "Artemisa")]
    Artemisa,
    #[serde(rename = "La Habana")]
    LaHabana,
    #[serde(rename = "Mayabeque")]
    Mayabeque,
    #[serde(rename = "Matanzas")]
    Matanzas,
    #[serde(rename = "Villa Clara")]
    VillaClara,
    #[serde(rename = "Cienfuegos")]
    Cienfuegos,
    #[serde(rename = "Sancti Spíritus")]
    SanctiSpiritus,
    #[serde(rename = "Ciego de Ávila")]
    CiegoDeAvila,
    #[serde(rename = "Camagüey")]
    Camaguey,
    #[serde(rename = "Las Tunas")]
    LasTunas,
    #[serde(rename = "Holguín")]
    Holguin,
    #[serde(rename = "Granma")]
    Granma,
    #[serde(rename = "Santiago de Cuba")]
    SantiagoDeCuba,
    #[serde(rename = "Guantánamo")]
    Guantanamo,
    #[serde(rename = "Isla de la Juventud")]
    IslaDeLaJuventud,
}

impl Province {
    pub const ALL: [Province; 16] = [
        Province::PinarDelRio,
        Province::Artemisa,
        Province::LaHabana,
        Province::Mayabeque,
        Province::Matanzas,
        Province::VillaClara,
        Province::Cienfuegos,
        Province::SanctiSpiritus,
        Province::CiegoDeAvila,
        Province::Camaguey,
        Province::LasTunas,
        Province::Holguin,
        Province::Granma,
        Province::SantiagoDeCuba,
        Province::Guantanamo,
        Province::IslaDeLaJuventud,
    ];

    /// Display name, also used on the wire and in the database
    pub fn name(&self) -> &'static str {
        match self {
            Province::PinarDelRio => "Pinar del Río",
            Province::Artemisa => "Artemisa",
            Province::LaHabana => "La Habana",
            Province::Mayabeque => "Mayabeque",
            Province::Matanzas => "Matanzas",
            Province::VillaClara => "Villa Clara",
            Province::Cienfuegos => "Cienfuegos",
            Province::SanctiSpiritus => "Sancti Spíritus",
            Province::CiegoDeAvila => "Ciego de Ávila",
            Province::Camaguey => "Camagüey",
            Province::LasTunas => "Las Tunas",
            Province::Holguin => "Holguín",
            Province::Granma => "Granma",
            Province::SantiagoDeCuba => "Santiago de Cuba",
            Province::Guantanamo => "Guantánamo",
            Province::IslaDeLaJuventud => "Isla de la Juventud",
        }
    }

    pub fn from_name(name: &str) -> Option<Province> {
        Province::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Municipalities belonging to this province
    pub fn municipalities(&self) -> &'static [&'static str] {
        match self {
            Province::PinarDelRio => &[
                "Sandino",
                "Mantua",
                "Minas de Matahambre",
                "Viñales",
                "La Palma",
                "Los Palacios",
                "Consolación del Sur",
                "Pinar del Río",
                "San Luis",
                "San Juan y Martínez",
                "Guane",
            ],
            Province::Artemisa => &[
                "Bahía Honda",
                "Mariel",
                "Guanajay",
                "Caimito",
                "Bauta",
                "San Antonio de los Baños",
                "Güira de Melena",
                "Alquízar",
                "Artemisa",
                "Candelaria",
                "San Cristóbal",
            ],
            Province::LaHabana => &[
                "Playa",
                "Plaza de la Revolución",
                "Centro Habana",
                "La Habana Vieja",
                "Regla",
                "La Habana del Este",
                "Guanabacoa",
                "San Miguel del Padrón",
                "Diez de Octubre",
                "Cerro",
                "Marianao",
                "La Lisa",
                "Boyeros",
                "Arroyo Naranjo",
                "Cotorro",
            ],
            Province::Mayabeque => &[
                "Bejucal",
                "San José de las Lajas",
                "Jaruco",
                "Santa Cruz del Norte",
                "Madruga",
                "Nueva Paz",
                "San Nicolás",
                "Güines",
                "Melena del Sur",
                "Batabanó",
                "Quivicán",
            ],
            Province::Matanzas => &[
                "Matanzas",
                "Cárdenas",
                "Martí",
                "Colón",
                "Perico",
                "Jovellanos",
                "Pedro Betancourt",
                "Limonar",
                "Unión de Reyes",
                "Ciénaga de Zapata",
                "Jagüey Grande",
                "Calimete",
                "Los Arabos",
            ],
            Province::VillaClara => &[
                "Corralillo",
                "Quemado de Güines",
                "Sagua la Grande",
                "Encrucijada",
                "Camajuaní",
                "Caibarién",
                "Remedios",
                "Placetas",
                "Santa Clara",
                "Cifuentes",
                "Santo Domingo",
                "Ranchuelo",
                "Manicaragua",
            ],
            Province::Cienfuegos => &[
                "Aguada de Pasajeros",
                "Rodas",
                "Palmira",
                "Lajas",
                "Cruces",
                "Cumanayagua",
                "Cienfuegos",
                "Abreus",
            ],
            Province::SanctiSpiritus => &[
                "Yaguajay",
                "Jatibonico",
                "Taguasco",
                "Cabaiguán",
                "Fomento",
                "Trinidad",
                "Sancti Spíritus",
                "La Sierpe",
            ],
            Province::CiegoDeAvila => &[
                "Chambas",
                "Morón",
                "Bolivia",
                "Primero de Enero",
                "Ciro Redondo",
                "Florencia",
                "Majagua",
                "Ciego de Ávila",
                "Venezuela",
                "Baraguá",
            ],
            Province::Camaguey => &[
                "Carlos Manuel de Céspedes",
                "Esmeralda",
                "Sierra de Cubitas",
                "Minas",
                "Nuevitas",
                "Guáimaro",
                "Sibanicú",
                "Camagüey",
                "Florida",
                "Vertientes",
                "Jimaguayú",
                "Najasa",
                "Santa Cruz del Sur",
            ],
            Province::LasTunas => &[
                "Manatí",
                "Puerto Padre",
                "Jesús Menéndez",
                "Majibacoa",
                "Las Tunas",
                "Jobabo",
                "Colombia",
                "Amancio",
            ],
            Province::Holguin => &[
                "Gibara",
                "Rafael Freyre",
                "Banes",
                "Antilla",
                "Báguanos",
                "Holguín",
                "Calixto García",
                "Cacocum",
                "Urbano Noris",
                "Cueto",
                "Mayarí",
                "Frank País",
                "Sagua de Tánamo",
                "Moa",
            ],
            Province::Granma => &[
                "Río Cauto",
                "Cauto Cristo",
                "Jiguaní",
                "Bayamo",
                "Yara",
                "Manzanillo",
                "Campechuela",
                "Media Luna",
                "Niquero",
                "Pilón",
                "Bartolomé Masó",
                "Buey Arriba",
                "Guisa",
            ],
            Province::SantiagoDeCuba => &[
                "Contramaestre",
                "Mella",
                "San Luis",
                "Segundo Frente",
                "Songo - La Maya",
                "Santiago de Cuba",
                "Palma Soriano",
                "Tercer Frente",
                "Guamá",
            ],
            Province::Guantanamo => &[
                "El Salvador",
                "Manuel Tames",
                "Yateras",
                "Baracoa",
                "Maisí",
                "Imías",
                "San Antonio del Sur",
                "Caimanera",
                "Guantánamo",
                "Niceto Pérez",
            ],
            Province::IslaDeLaJuventud => &["Isla de la Juventud"],
        }
    }

    pub fn has_municipality(&self, municipality: &str) -> bool {
        self.municipalities().contains(&municipality)
    }

    /// Capital municipality, used to preselect forms
    pub fn default_municipality(&self) -> &'static str {
        match self {
            Province::LaHabana => "La Habana Vieja",
            Province::Mayabeque => "San José de las Lajas",
            Province::VillaClara => "Santa Clara",
            Province::Granma => "Bayamo",
            other => other.name(),
        }
    }
}

impl std::fmt::Display for Province {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Location of a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub province: Province,
    pub municipality: String,
}
