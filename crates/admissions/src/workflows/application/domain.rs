use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for wizard sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Highest completed education level offered in the education step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    HighSchoolDiploma,
    AssociateDegree,
    BachelorsDegree,
    MastersDegree,
    DoctoralDegree,
    ProfessionalDegree,
    Other,
}

impl EducationLevel {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::HighSchoolDiploma,
            Self::AssociateDegree,
            Self::BachelorsDegree,
            Self::MastersDegree,
            Self::DoctoralDegree,
            Self::ProfessionalDegree,
            Self::Other,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HighSchoolDiploma => "High School Diploma",
            Self::AssociateDegree => "Associate Degree",
            Self::BachelorsDegree => "Bachelor's Degree",
            Self::MastersDegree => "Master's Degree",
            Self::DoctoralDegree => "Doctoral Degree",
            Self::ProfessionalDegree => "Professional Degree",
            Self::Other => "Other",
        }
    }
}

/// Delivery format shared by applications and catalog programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StudyMode {
    Online,
    Hybrid,
    OnCampus,
}

impl StudyMode {
    pub const fn ordered() -> [Self; 3] {
        [Self::Online, Self::Hybrid, Self::OnCampus]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Hybrid => "hybrid",
            Self::OnCampus => "on-campus",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Online => "Online",
            Self::Hybrid => "Hybrid",
            Self::OnCampus => "On Campus",
        }
    }
}

fn content_type_for(name: &str) -> mime::Mime {
    let extension = name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase());
    match extension.as_deref() {
        Some("pdf") => mime::APPLICATION_PDF,
        Some("jpg" | "jpeg") => mime::IMAGE_JPEG,
        Some("png") => mime::IMAGE_PNG,
        Some("txt") => mime::TEXT_PLAIN,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// Reference to a file picked by the applicant. Only metadata is held; bytes never leave the
/// client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub size_bytes: u64,
    pub content_type: String,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        let name = name.into();
        let content_type = content_type_for(&name).essence_str().to_string();
        Self {
            name,
            size_bytes,
            content_type,
        }
    }

    /// Lower-cased extension with its leading dot. A name without a dot yields the whole name,
    /// which never matches an allow-list entry.
    pub fn extension(&self) -> String {
        let last = self.name.rsplit('.').next().unwrap_or_default();
        format!(".{}", last.to_lowercase())
    }
}

/// The five named document positions of the documents step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSlot {
    Transcript,
    Diploma,
    Cv,
    Passport,
    LanguageCertificate,
}

impl DocumentSlot {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Transcript,
            Self::Diploma,
            Self::Cv,
            Self::Passport,
            Self::LanguageCertificate,
        ]
    }

    pub const fn field(self) -> ApplicationField {
        match self {
            Self::Transcript => ApplicationField::Transcript,
            Self::Diploma => ApplicationField::Diploma,
            Self::Cv => ApplicationField::Cv,
            Self::Passport => ApplicationField::Passport,
            Self::LanguageCertificate => ApplicationField::LanguageCertificate,
        }
    }
}

/// Slot contents. Replaced as a whole when patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSlots {
    pub transcript: Option<UploadedFile>,
    pub diploma: Option<UploadedFile>,
    pub cv: Option<UploadedFile>,
    pub passport: Option<UploadedFile>,
    pub language_certificate: Option<UploadedFile>,
}

impl DocumentSlots {
    pub fn get(&self, slot: DocumentSlot) -> Option<&UploadedFile> {
        match slot {
            DocumentSlot::Transcript => self.transcript.as_ref(),
            DocumentSlot::Diploma => self.diploma.as_ref(),
            DocumentSlot::Cv => self.cv.as_ref(),
            DocumentSlot::Passport => self.passport.as_ref(),
            DocumentSlot::LanguageCertificate => self.language_certificate.as_ref(),
        }
    }

    pub fn with(mut self, slot: DocumentSlot, file: Option<UploadedFile>) -> Self {
        let target = match slot {
            DocumentSlot::Transcript => &mut self.transcript,
            DocumentSlot::Diploma => &mut self.diploma,
            DocumentSlot::Cv => &mut self.cv,
            DocumentSlot::Passport => &mut self.passport,
            DocumentSlot::LanguageCertificate => &mut self.language_certificate,
        };
        *target = file;
        self
    }

    pub fn uploaded(&self) -> Vec<(DocumentSlot, &UploadedFile)> {
        DocumentSlot::ordered()
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|file| (slot, file)))
            .collect()
    }
}

/// Every field a step can report an error against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationField {
    FirstName,
    LastName,
    Email,
    Phone,
    DateOfBirth,
    Nationality,
    Address,
    City,
    PostalCode,
    Country,
    HighestEducation,
    InstitutionName,
    GraduationYear,
    Gpa,
    FieldOfStudy,
    SelectedProgram,
    PreferredStartDate,
    StudyMode,
    Transcript,
    Diploma,
    Cv,
    Passport,
    LanguageCertificate,
    MotivationLetter,
    CareerGoals,
    WhyThisProgram,
    AgreeToTerms,
    AgreeToPrivacy,
    AgreeToMarketing,
}

impl ApplicationField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First name",
            Self::LastName => "Last name",
            Self::Email => "Email",
            Self::Phone => "Phone number",
            Self::DateOfBirth => "Date of birth",
            Self::Nationality => "Nationality",
            Self::Address => "Address",
            Self::City => "City",
            Self::PostalCode => "Postal code",
            Self::Country => "Country",
            Self::HighestEducation => "Highest education",
            Self::InstitutionName => "Institution name",
            Self::GraduationYear => "Graduation year",
            Self::Gpa => "GPA",
            Self::FieldOfStudy => "Field of study",
            Self::SelectedProgram => "Program selection",
            Self::PreferredStartDate => "Preferred start date",
            Self::StudyMode => "Study mode",
            Self::Transcript => "Academic Transcript",
            Self::Diploma => "Diploma/Certificate",
            Self::Cv => "Curriculum Vitae (CV)",
            Self::Passport => "Passport Copy",
            Self::LanguageCertificate => "Language Certificate",
            Self::MotivationLetter => "Motivation letter",
            Self::CareerGoals => "Career goals",
            Self::WhyThisProgram => "Why this program",
            Self::AgreeToTerms => "Terms and conditions",
            Self::AgreeToPrivacy => "Privacy policy",
            Self::AgreeToMarketing => "Marketing communication",
        }
    }
}

/// The accumulating application owned by one wizard session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub nationality: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,

    pub highest_education: Option<EducationLevel>,
    pub institution_name: String,
    pub graduation_year: Option<i32>,
    pub gpa: String,
    pub field_of_study: String,

    pub selected_program: Option<String>,
    pub preferred_start_date: Option<NaiveDate>,
    pub study_mode: Option<StudyMode>,

    pub documents: DocumentSlots,

    pub motivation_letter: String,
    pub career_goals: String,
    pub why_this_program: String,

    pub agree_to_terms: bool,
    pub agree_to_privacy: bool,
    pub agree_to_marketing: bool,
}

/// Partial update of an [`ApplicationRecord`]. Absent keys leave the record untouched; for
/// optional record fields an explicit `null` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApplicationPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub nationality: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,

    #[serde(deserialize_with = "present")]
    pub highest_education: Option<Option<EducationLevel>>,
    pub institution_name: Option<String>,
    #[serde(deserialize_with = "present")]
    pub graduation_year: Option<Option<i32>>,
    pub gpa: Option<String>,
    pub field_of_study: Option<String>,

    #[serde(deserialize_with = "present")]
    pub selected_program: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub preferred_start_date: Option<Option<NaiveDate>>,
    #[serde(deserialize_with = "present")]
    pub study_mode: Option<Option<StudyMode>>,

    pub documents: Option<DocumentSlots>,

    pub motivation_letter: Option<String>,
    pub career_goals: Option<String>,
    pub why_this_program: Option<String>,

    pub agree_to_terms: Option<bool>,
    pub agree_to_privacy: Option<bool>,
    pub agree_to_marketing: Option<bool>,
}

/// Distinguish a present `null` from an absent key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

macro_rules! merge_fields {
    ($record:ident, $patch:ident, $touched:ident; $($field:ident => $variant:ident),+ $(,)?) => {
        $(
            if let Some(value) = $patch.$field {
                $record.$field = value;
                $touched.push(ApplicationField::$variant);
            }
        )+
    };
}

impl ApplicationRecord {
    /// Shallow merge, last write wins. Returns the fields the patch touched.
    pub fn apply(&mut self, patch: ApplicationPatch) -> Vec<ApplicationField> {
        let mut touched = Vec::new();
        let record = self;

        merge_fields!(record, patch, touched;
            first_name => FirstName,
            last_name => LastName,
            email => Email,
            phone => Phone,
            date_of_birth => DateOfBirth,
            nationality => Nationality,
            address => Address,
            city => City,
            postal_code => PostalCode,
            country => Country,
            highest_education => HighestEducation,
            institution_name => InstitutionName,
            graduation_year => GraduationYear,
            gpa => Gpa,
            field_of_study => FieldOfStudy,
            selected_program => SelectedProgram,
            preferred_start_date => PreferredStartDate,
            study_mode => StudyMode,
            motivation_letter => MotivationLetter,
            career_goals => CareerGoals,
            why_this_program => WhyThisProgram,
            agree_to_terms => AgreeToTerms,
            agree_to_privacy => AgreeToPrivacy,
            agree_to_marketing => AgreeToMarketing,
        );

        if let Some(documents) = patch.documents {
            record.documents = documents;
            touched.extend(DocumentSlot::ordered().into_iter().map(DocumentSlot::field));
        }

        touched
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

impl ApplicationPatch {
    pub fn documents(documents: DocumentSlots) -> Self {
        Self {
            documents: Some(documents),
            ..Self::default()
        }
    }
}
