//! Static legal knowledge: one profile per category.
//!
//! The table drives classification (keywords, walked in declaration order),
//! the instruction text (description), citations, the UI quick-topic label
//! and the canned answer used when no model is reachable.

use lexline_core::category::Category;

/// Everything the pipeline knows about one category.
#[derive(Debug)]
pub struct CategoryProfile {
    pub category: Category,
    /// Quick-topic button text.
    pub label: &'static str,
    /// Lowercase substrings that select this category.
    pub keywords: &'static [&'static str],
    pub description: &'static str,
    /// Comma-joined legislation list attached to every answer.
    pub citations: &'static str,
    /// Canned answer; `None` means the general template is used.
    pub fallback: Option<&'static FallbackTemplate>,
}

/// A pre-written answer block.
///
/// `opening` contains a `{question}` placeholder for the echoed message.
#[derive(Debug)]
pub struct FallbackTemplate {
    pub title: &'static str,
    pub opening: &'static str,
    pub body: &'static str,
}

static EMPLOYMENT_FALLBACK: FallbackTemplate = FallbackTemplate {
    title: "**Employment Rights Information**",
    opening: "Based on your question about \"{question}\", here's some key UK employment law information:",
    body: "\
**Your Key Rights:**
• **Contract Terms**: You're entitled to a written statement of terms from your first day of work
• **Minimum Wage**: You must be paid at least the National Minimum Wage or National Living Wage for your age
• **Notice Periods**: Minimum 1 week after 1 month's service, then 1 week per complete year (up to 12 weeks)
• **Unfair Dismissal**: Protected after 2 years' continuous service (Employment Rights Act 1996, s.108)
• **Discrimination**: Protected characteristics include age, disability, sex, race, religion and sexual orientation (Equality Act 2010)

**Next Steps:**
1. Check your written contract terms
2. Keep records of all communications with your employer
3. Contact ACAS (Advisory, Conciliation and Arbitration Service) for free guidance
4. Strict time limits apply to tribunal claims, so act promptly",
};

static HOUSING_FALLBACK: FallbackTemplate = FallbackTemplate {
    title: "**Housing & Tenancy Rights Information**",
    opening: "Regarding your housing question \"{question}\", here are your key UK tenant rights:",
    body: "\
**Your Rights as a Tenant:**
• **Deposit Protection**: Landlords must protect your deposit in a government-approved scheme within 30 days
• **Repairs**: Landlords must keep the structure, exterior and utilities in repair (Landlord and Tenant Act 1985, s.11)
• **Access**: Landlords must usually give at least 24 hours' notice before entering
• **Eviction**: Only a court order can end your right to live in the property
• **Safe Housing**: The property must be free from serious hazards (Housing Act 2004)

**Common Protections:**
• Section 21 notices require at least 2 months' notice for assured shorthold tenancies
• Section 8 notices must rely on specific statutory grounds
• Rent increases must follow the proper procedure
• Harassment and illegal eviction by landlords are criminal offences

**Next Steps:**
1. Check which type of tenancy agreement you have
2. Document any issues with photos and written records
3. Contact Shelter for free housing advice
4. Contact your local council's housing team for serious issues",
};

static CONSUMER_FALLBACK: FallbackTemplate = FallbackTemplate {
    title: "**Consumer Rights Information**",
    opening: "About your consumer rights question \"{question}\", here's what UK law protects:",
    body: "\
**Your Consumer Rights:**
• **Goods Must Be**: As described, fit for purpose and of satisfactory quality
• **Refund Rights**: 30 days to reject faulty goods for a full refund
• **Repair or Replace**: After 30 days the trader gets one chance to repair or replace
• **Services**: Must be carried out with reasonable care and skill
• **Distance Selling**: 14-day cancellation period for most online and phone purchases

**Key Laws:**
• Consumer Rights Act 2015
• Consumer Contracts Regulations 2013
• Sale of Goods Act 1979 (for contracts made before October 2015)

**Next Steps:**
1. Contact the trader first to resolve the issue
2. Keep all receipts and documentation
3. Contact Citizens Advice for free guidance
4. Consider Alternative Dispute Resolution (ADR)
5. Use the small claims court for unresolved disputes",
};

static GENERAL_FALLBACK: FallbackTemplate = FallbackTemplate {
    title: "**UK Legal Information**",
    opening: "Thank you for your question about \"{question}\". Our AI service is temporarily unavailable, so here is some general guidance:",
    body: "\
**Key UK Legal Resources:**
• **Citizens Advice**: Free, confidential advice on legal issues
• **Law Society**: Find qualified solicitors in your area
• **Gov.uk**: Official government legal guidance
• **Legal Aid**: May be available for certain cases

**Common Legal Areas:**
• Employment law and workplace rights
• Housing and tenancy issues
• Consumer rights and purchases
• Family law and relationships
• Immigration and nationality
• Benefits and social security

**Next Steps:**
1. Contact Citizens Advice for free initial guidance
2. Check whether you qualify for legal aid
3. Keep detailed records of your situation

*Detailed, context-aware answers will return once the AI service is available again.*",
};

/// One row per category, in [`Category::ALL`] order.
pub static PROFILES: [CategoryProfile; 13] = [
    CategoryProfile {
        category: Category::Employment,
        label: "Employment Rights",
        keywords: &[
            "job", "work", "employer", "fired", "dismissed", "wages", "salary", "overtime",
            "holiday", "sick leave", "discrimination", "harassment", "redundancy",
            "notice period", "contract", "tribunal", "unfair dismissal", "maternity", "paternity",
        ],
        description: "UK Employment law including Employment Rights Act 1996, National Minimum Wage Act 1998, Equality Act 2010, Working Time Regulations 1998",
        citations: "Employment Rights Act 1996, National Minimum Wage Act 1998, Equality Act 2010, Working Time Regulations 1998, ACAS Employment Law Guide 2024",
        fallback: Some(&EMPLOYMENT_FALLBACK),
    },
    CategoryProfile {
        category: Category::Housing,
        label: "Housing & Tenancy",
        keywords: &[
            "rent", "landlord", "tenant", "eviction", "deposit", "repairs", "housing", "lease",
            "council", "homeless", "section 21", "section 8", "assured shorthold",
        ],
        description: "UK Housing law including Housing Act 1988, Landlord and Tenant Act 1985, Housing Act 2004, Tenancy Deposit Schemes",
        citations: "Housing Act 1988, Landlord and Tenant Act 1985, Housing Act 2004, Tenancy Deposit Schemes, Consumer Rights Act 2015",
        fallback: Some(&HOUSING_FALLBACK),
    },
    CategoryProfile {
        category: Category::Consumer,
        label: "Consumer Rights",
        keywords: &[
            "purchase", "refund", "warranty", "guarantee", "faulty", "goods", "services", "shop",
            "online", "delivery", "return", "cancellation",
        ],
        description: "UK Consumer law including Consumer Rights Act 2015, Consumer Contracts Regulations 2013",
        citations: "Consumer Rights Act 2015, Consumer Contracts Regulations 2013, Consumer Credit Act 1974, Competition and Markets Authority Guidelines",
        fallback: Some(&CONSUMER_FALLBACK),
    },
    CategoryProfile {
        category: Category::Police,
        label: "Police Encounters",
        keywords: &[
            "police", "arrest", "stop", "search", "custody", "interview", "solicitor", "rights",
            "caution", "bail", "charge", "detention",
        ],
        description: "UK Police powers and citizen rights including Police and Criminal Evidence Act 1984 (PACE), Human Rights Act 1998",
        citations: "Police and Criminal Evidence Act 1984 (PACE), Human Rights Act 1998, Criminal Justice and Public Order Act 1994",
        fallback: None,
    },
    CategoryProfile {
        category: Category::Family,
        label: "Family Law",
        keywords: &[
            "divorce", "separation", "custody", "child support", "maintenance", "marriage",
            "domestic violence", "family court",
        ],
        description: "UK Family law including Children Act 1989, Divorce Dissolution and Separation Act 2020, Family Law Act 1996",
        citations: "Children Act 1989, Divorce Dissolution and Separation Act 2020, Family Law Act 1996, Civil Partnership Act 2004",
        fallback: None,
    },
    CategoryProfile {
        category: Category::Benefits,
        label: "Benefits & Universal Credit",
        keywords: &[
            "benefits", "universal credit", "jobseekers", "esa", "pip", "disability",
            "housing benefit", "council tax",
        ],
        description: "UK Benefits and social security including Welfare Reform Act 2012, Social Security Administration Act 1992",
        citations: "Welfare Reform Act 2012, Universal Credit Regulations 2013, Social Security Administration Act 1992, DWP Guidance 2024",
        fallback: None,
    },
    CategoryProfile {
        category: Category::Health,
        label: "Healthcare Rights",
        keywords: &[
            "nhs", "hospital", "doctor", "medical", "treatment", "patient", "mental health",
            "care home",
        ],
        description: "UK Healthcare rights including the NHS Constitution, Mental Health Act 1983, Care Act 2014, Health and Social Care Act 2012",
        citations: "NHS Constitution for England, Mental Health Act 1983, Care Act 2014, Health and Social Care Act 2012",
        fallback: None,
    },
    CategoryProfile {
        category: Category::Immigration,
        label: "Immigration",
        keywords: &[
            "visa", "immigration", "asylum", "deportation", "home office", "residence permit",
            "citizenship", "settled status", "refugee",
        ],
        description: "UK Immigration law including Immigration Act 1971, Nationality, Immigration and Asylum Act 2002, the Immigration Rules",
        citations: "Immigration Act 1971, Nationality, Immigration and Asylum Act 2002, Immigration Rules, Borders, Citizenship and Immigration Act 2009",
        fallback: None,
    },
    CategoryProfile {
        category: Category::Criminal,
        label: "Criminal Law",
        keywords: &[
            "crime", "criminal", "court", "prosecution", "sentence", "conviction", "offence",
            "magistrates", "theft", "assault",
        ],
        description: "UK Criminal law including Criminal Justice Act 2003, Sentencing Act 2020, Theft Act 1968, Offences Against the Person Act 1861",
        citations: "Criminal Justice Act 2003, Sentencing Act 2020, Theft Act 1968, Offences Against the Person Act 1861",
        fallback: None,
    },
    CategoryProfile {
        category: Category::Discrimination,
        label: "Discrimination",
        keywords: &["racism", "racial", "sexism", "equal pay", "equality act", "prejudice"],
        description: "UK Discrimination and equality law including Equality Act 2010, Human Rights Act 1998",
        citations: "Equality Act 2010, Human Rights Act 1998, Protection from Harassment Act 1997, Equality and Human Rights Commission Guidance",
        fallback: None,
    },
    CategoryProfile {
        category: Category::Data,
        label: "Data Protection",
        keywords: &[
            "gdpr", "data protection", "personal data", "subject access", "privacy",
            "data breach", "information commissioner",
        ],
        description: "UK Data protection law including UK GDPR, Data Protection Act 2018, Privacy and Electronic Communications Regulations 2003",
        citations: "UK GDPR, Data Protection Act 2018, Privacy and Electronic Communications Regulations 2003, ICO Guidance",
        fallback: None,
    },
    CategoryProfile {
        category: Category::Debt,
        label: "Debt & Money",
        keywords: &[
            "debt", "bailiff", "creditor", "loan", "ccj", "county court judgment", "arrears",
            "bankruptcy", "credit card", "overdraft",
        ],
        description: "UK Debt law including Consumer Credit Act 1974, Taking Control of Goods Regulations 2013, Insolvency Act 1986, Limitation Act 1980",
        citations: "Consumer Credit Act 1974, Taking Control of Goods Regulations 2013, Insolvency Act 1986, Limitation Act 1980",
        fallback: None,
    },
    CategoryProfile {
        category: Category::General,
        label: "General Legal Information",
        keywords: &[],
        description: "General UK legal information",
        citations: "UK Legal System, Human Rights Act 1998, Citizens Advice Legal Guidance",
        fallback: Some(&GENERAL_FALLBACK),
    },
];

/// Profile for `category`. Never fails: every category has a row.
pub fn profile(category: Category) -> &'static CategoryProfile {
    PROFILES
        .iter()
        .find(|p| p.category == category)
        .unwrap_or(&PROFILES[PROFILES.len() - 1])
}

/// The canned answer block for `category`, defaulting to the general one.
pub fn fallback_template(category: Category) -> &'static FallbackTemplate {
    profile(category).fallback.unwrap_or(&GENERAL_FALLBACK)
}
