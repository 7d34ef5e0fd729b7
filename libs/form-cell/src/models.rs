use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A stored clinical form. Exactly one document exists per
/// (patient, form type) pair; saving again overwrites it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    pub id: Uuid,
    pub patient_id: Uuid,
    #[serde(flatten)]
    pub payload: FormPayload,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormType {
    Cidh,
    ClinicHistoryOld,
    Fistula,
    Hemodialysis,
    MedicationSheet,
    ExamControls,
    MonthlyProgress,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::Cidh => "cidh",
            FormType::ClinicHistoryOld => "clinicHistoryOld",
            FormType::Fistula => "fistula",
            FormType::Hemodialysis => "hemodialysis",
            FormType::MedicationSheet => "medicationSheet",
            FormType::ExamControls => "examControls",
            FormType::MonthlyProgress => "monthlyProgress",
        }
    }
}

/// Form contents, dispatched on the stored `type` discriminator. An
/// unknown type or a body that does not match its variant is rejected
/// at deserialization, so services only ever see well-formed forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum FormPayload {
    Cidh(CidhForm),
    ClinicHistoryOld(ClinicHistoryForm),
    Fistula(FistulaForm),
    Hemodialysis(HemodialysisForm),
    MedicationSheet(MedicationSheetForm),
    ExamControls(ExamControlsForm),
    MonthlyProgress(MonthlyProgressForm),
}

impl FormPayload {
    pub fn form_type(&self) -> FormType {
        match self {
            FormPayload::Cidh(_) => FormType::Cidh,
            FormPayload::ClinicHistoryOld(_) => FormType::ClinicHistoryOld,
            FormPayload::Fistula(_) => FormType::Fistula,
            FormPayload::Hemodialysis(_) => FormType::Hemodialysis,
            FormPayload::MedicationSheet(_) => FormType::MedicationSheet,
            FormPayload::ExamControls(_) => FormType::ExamControls,
            FormPayload::MonthlyProgress(_) => FormType::MonthlyProgress,
        }
    }
}

// --- CIDH (dialysis-catheter infection surveillance) ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CidhForm {
    pub access: CidhAccess,
    pub nursing: CidhNursing,
    pub medical: CidhMedical,
    pub follow_up: CidhFollowUp,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessCheck {
    pub active: bool,
    pub date: Option<String>,
    pub unknown_date: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CidhAccess {
    pub fistula: AccessCheck,
    pub graft: AccessCheck,
    pub perm_catheter: AccessCheck,
    pub temp_catheter: AccessCheck,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CidhNursing {
    pub fever: bool,
    pub chills: bool,
    pub cough: bool,
    pub hypotension: bool,
    pub pus: bool,
    pub cellulitis: bool,
    pub wound: bool,
    pub other: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SymptomCheck {
    pub active: bool,
    pub start: Option<String>,
    #[serde(rename = "char")]
    pub quality: Option<String>,
    pub desc: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CidhMedical {
    pub symptoms: BTreeMap<String, SymptomCheck>,
    pub diagnosis: CidhDiagnosis,
    pub tests: CidhTests,
    pub referral: CidhReferral,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CidhDiagnosis {
    pub vascular_infection: bool,
    pub pneumonia: bool,
    pub cellulitis: bool,
    pub uti: bool,
    pub cold: bool,
    pub tb: bool,
    pub diabetic_foot: bool,
    pub other: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CidhTests {
    pub blood_culture: bool,
    pub urine_culture: bool,
    pub hemogram: bool,
    pub other: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CidhReferral {
    pub sent: bool,
    #[serde(rename = "where")]
    pub destination: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CidhFollowUp {
    pub date: Option<String>,
    pub hospitalized: bool,
    pub result: CultureResult,
    pub treatment_start: TreatmentStart,
    pub outcomes: FollowUpOutcomes,
    pub logs: Vec<TreatmentLogEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CultureResult {
    pub hemoculture: bool,
    pub positive: bool,
    pub negative: bool,
    pub pathogen: PathogenResult,
    pub sensitivity: SensitivityResult,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PathogenResult {
    pub staph_aureus: bool,
    pub other: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SensitivityResult {
    pub vancomycin: bool,
    pub other: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreatmentStart {
    pub iv_vancomycin: bool,
    pub dose: Option<String>,
    pub every_x_days: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FollowUpOutcomes {
    pub completed: Option<String>,
    pub abandoned: Option<String>,
    pub why_abandoned: Option<String>,
    pub continuing_fever: Option<String>,
    pub referred_again: Option<String>,
    pub final_comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreatmentLogEntry {
    pub date: Option<String>,
    pub patient_brought: bool,
    pub dose_indicated: Option<String>,
    pub dose_admin: Option<String>,
    pub route: Option<String>,
    pub comment: Option<String>,
}

// --- Vascular access clinical history (legacy sheet) ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClinicHistoryForm {
    pub general: GeneralInfo,
    pub history: AccessHistory,
    pub physical_exam: PhysicalExam,
    pub follow_up: Vec<FollowUpNote>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralInfo {
    pub name: String,
    pub occupation: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessHistory {
    pub age_range: String,
    pub sex: String,
    pub comorbidities: Comorbidities,
    pub time_in_hd: String,
    pub access_type: AccessType,
    pub placement_date: PlacementDate,
    pub location: BTreeMap<String, bool>,
    pub functionality: Functionality,
    pub dysfunction: Dysfunction,
    pub seals: Seals,
    pub thrombolysis: Thrombolysis,
    #[serde(rename = "previousAV")]
    pub previous_av: String,
    pub previous_location: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Comorbidities {
    pub other: String,
    #[serde(flatten)]
    pub flags: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessType {
    pub other: String,
    #[serde(flatten)]
    pub flags: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlacementDate {
    pub exact: String,
    pub approx: String,
    pub dont_remember: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Functionality {
    pub arterial: bool,
    pub venous: bool,
    pub both: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dysfunction {
    pub mechanical_obstruction: GradedFinding,
    pub clots: bool,
    pub fibrin: bool,
    pub kinking: bool,
    pub other: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GradedFinding {
    pub active: bool,
    #[serde(rename = "type")]
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Seals {
    pub heparin: bool,
    pub duralock: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Thrombolysis {
    pub active: Option<bool>,
    pub count: String,
    pub time_ago: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicalExam {
    pub inspection: BTreeMap<String, bool>,
    pub palpation: BTreeMap<String, bool>,
    pub auscultation: BTreeMap<String, bool>,
    pub mature_characteristics: MatureCharacteristics,
    pub observations: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatureCharacteristics {
    pub hemostasis_time: Option<String>,
    pub stenosis: Option<bool>,
    pub aneurysms: Option<String>,
    pub steal_syndrome: Option<bool>,
    pub tortuous: Option<bool>,
    pub thrombosis: ThrombosisFinding,
    pub site_rotation: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThrombosisFinding {
    pub active: bool,
    #[serde(rename = "type")]
    pub grade: Option<String>,
    pub observation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FollowUpNote {
    pub date: String,
    pub obs: String,
}

// --- Fistula maturation checklist ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FistulaForm {
    pub patient_name: String,
    pub age: String,
    pub status_color: Option<String>,
    pub fistula_type: FistulaType,
    pub checks: BTreeMap<String, ActiveFlag>,
    pub observation: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FistulaType {
    pub autologous: bool,
    pub prosthetic: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActiveFlag {
    pub active: Option<bool>,
}

// --- Hemodialysis admission history ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HemodialysisForm {
    pub exp: String,
    pub date: String,
    #[serde(rename = "startDateHD")]
    pub start_date_hd: String,
    pub name: String,
    pub age: String,
    pub sex: String,
    pub civil_status: String,
    pub occupation: String,
    pub birth_place: String,
    pub birth_date: String,
    pub residence: String,
    pub phone: String,
    pub etiology: Etiology,
    pub frequency: String,
    pub session_time: String,
    pub membrane: String,
    pub anticoagulation: String,
    pub dry_weight: String,
    pub heparin_dose: String,
    pub access: VascularAccess,
    pub viral: ViralPanel,
    pub current_illness: String,
    pub personal_pathology: String,
    pub family_history: String,
    pub surgical_history: String,
    pub exam: BTreeMap<String, String>,
    pub meds: BTreeMap<String, String>,
    pub observations: String,
    pub labs: BTreeMap<String, String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Etiology {
    pub other_text: String,
    #[serde(flatten)]
    pub causes: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VascularAccess {
    pub temp_catheter: bool,
    pub tunneled_catheter: bool,
    pub fav: bool,
    pub observation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViralPanel {
    pub hbsag: String,
    pub acvhc: String,
    pub vih: String,
    pub updated: Option<bool>,
}

// --- Medication administration sheet ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MedicationSheetForm {
    pub patient_name: String,
    pub rows: Vec<MedicationRow>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MedicationRow {
    pub id: i64,
    pub medication: String,
    pub date: String,
    pub route: String,
    pub indications: String,
    pub dose: String,
    pub time: String,
    pub doctor_sign: String,
    pub nurse_sign: String,
}

// --- Periodic exam controls grid ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExamControlsForm {
    pub patient: ExamPatient,
    pub serology: Serology,
    pub rows: Vec<ExamRow>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExamPatient {
    pub name: String,
    pub age: String,
    pub file_number: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Serology {
    pub hep_b: Option<String>,
    pub hep_c: Option<String>,
    pub vih: Option<String>,
    pub tb: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExamRow {
    pub id: String,
    pub label: String,
    pub values: BTreeMap<String, String>,
}

// --- Monthly progress note ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonthlyProgressForm {
    pub meta: ProgressMeta,
    pub patient: ProgressPatient,
    pub general_status: GeneralStatus,
    pub comorbidities: ProgressComorbidities,
    pub access: ProgressAccess,
    pub dialysis_params: BTreeMap<String, Option<bool>>,
    pub current_treatment: BTreeMap<String, String>,
    pub prescription: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressMeta {
    pub month: String,
    pub file_number: String,
    pub doctor_signature: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressPatient {
    pub name: String,
    pub admission: Admission,
    pub diagnosis: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Admission {
    pub active: Option<bool>,
    pub date_in: String,
    pub date_out: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralStatus {
    pub transfusions: CountedFlag,
    pub interdialytic_gain: String,
    pub general_state: String,
    pub appetite: String,
    pub residual_diuresis: TypedFlag,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CountedFlag {
    pub active: Option<bool>,
    pub count: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypedFlag {
    pub active: Option<bool>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressComorbidities {
    pub treatment: String,
    pub other: String,
    #[serde(flatten)]
    pub flags: BTreeMap<String, Option<bool>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressAccess {
    pub fav: String,
    pub cvc: String,
    pub functionality: String,
    pub exam: String,
}

/// Monthly assessment document, keyed by (patient, month, year, type).
/// Unlike forms, the type set here is open-ended (e.g. "patientCard"), so
/// the payload stays untyped JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyAssessment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub month: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveAssessmentRequest {
    pub month: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentQuery {
    pub month: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Error, Debug)]
pub enum FormCellError {
    #[error("Record not found")]
    NotFound,
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}
