//! Built-in question bank and course catalog.
//!
//! Loaded once at startup and shared read-only through `AppState`.

use std::collections::BTreeMap;

use crate::assessment::models::{CourseDetails, Question, RoleTrack};

/// Questions shown per batch.
pub const BATCH_SIZE: usize = 5;
/// Batches per question set (general, role-specific).
pub const BATCHES_PER_SET: u8 = 2;

// (id, text, course recommendation, category)
type QuestionRow = (&'static str, &'static str, &'static str, &'static str);

const GENERAL_QUESTIONS: &[QuestionRow] = &[
    (
        "generalQ1",
        "Do you know how to turn on/off a laptop or desktop computer?",
        "Computer Basics 101",
        "basics",
    ),
    (
        "generalQ2",
        "Do you know how to use a web browser (e.g., Chrome, Edge, Firefox)?",
        "Web Browsing Fundamentals",
        "basics",
    ),
    (
        "generalQ3",
        "Do you know how to connect to Wi-Fi?",
        "Internet Connectivity Basics",
        "connectivity",
    ),
    (
        "generalQ4",
        "Do you know how to use email?",
        "Email Communication Essentials",
        "communication",
    ),
    (
        "generalQ5",
        "Do you know how to use Microsoft Word?",
        "Office Productivity Fundamentals",
        "productivity",
    ),
    (
        "generalQ6",
        "Do you know how to use copy and paste function?",
        "Computer Basics 101",
        "basics",
    ),
    (
        "generalQ7",
        "Do you know how to use USB drive or external storage device?",
        "File Management Essentials",
        "fileManagement",
    ),
    (
        "generalQ8",
        "Do you know how to install a software (e.g., Zoom, Microsoft Office)?",
        "Software Installation and Management",
        "software",
    ),
    (
        "generalQ9",
        "Do you know how to adjust simple computer settings like screen brightness, volume, or changing a desktop background?",
        "Computer Configuration Basics",
        "configuration",
    ),
    (
        "generalQ10",
        "Do you know how to restart a frozen application or reboot your computer when it's not responding?",
        "Troubleshooting Computer Problems",
        "troubleshooting",
    ),
];

const NETWORK_ADMIN_QUESTIONS: &[QuestionRow] = &[
    (
        "networkQ1",
        "Do you know what the Internet is and what it is used for?",
        "Introduction to Internet Technologies",
        "networking",
    ),
    (
        "networkQ2",
        "Do you know the difference between wired (Ethernet) and wireless (Wi-Fi) connection?",
        "Networking Fundamentals: Connectivity Types",
        "connectivity",
    ),
    (
        "networkQ3",
        "Have you ever entered a password to access a Wi-Fi network?",
        "Wi-Fi Network Configuration Basics",
        "connectivity",
    ),
    (
        "networkQ4",
        "Do you know how to check if a device is connected to the internet?",
        "Network Troubleshooting Basics",
        "troubleshooting",
    ),
    (
        "networkQ5",
        "Have you ever restarted a modem or router to fix a network issue?",
        "Network Hardware Management",
        "hardware",
    ),
    (
        "networkQ6",
        "Do you know what an IP address is?",
        "IP Addressing and Subnetting",
        "networking",
    ),
    (
        "networkQ7",
        "Can you find your IP address on your computer or phone?",
        "Network Configuration Essentials",
        "configuration",
    ),
    (
        "networkQ8",
        "Do you know what a router does in a network?",
        "Network Hardware Fundamentals",
        "hardware",
    ),
    (
        "networkQ9",
        "Have you ever used the ping command to test if a website is reachable?",
        "Network Diagnostics and Troubleshooting",
        "troubleshooting",
    ),
    (
        "networkQ10",
        "Do you understand what subnetting is and why it's used in networking?",
        "Advanced IP Addressing and Subnetting",
        "networking",
    ),
];

const CYBERSECURITY_QUESTIONS: &[QuestionRow] = &[
    (
        "cyberQ1",
        "Do you understand why we use passwords?",
        "Password Security Best Practices",
        "security",
    ),
    (
        "cyberQ2",
        "Have you ever been concerned about someone accessing your accounts without permission?",
        "Account Security and Protection",
        "security",
    ),
    (
        "cyberQ3",
        "Do you understand why using public Wi-Fi can be risky?",
        "Network Security Fundamentals",
        "security",
    ),
    (
        "cyberQ4",
        "Do you know what cyber security means?",
        "Introduction to Cybersecurity",
        "security",
    ),
    (
        "cyberQ5",
        "Have you ever heard one of these (Computer Virus, Phishing, Malware)?",
        "Common Cyber Threats and Attacks",
        "threats",
    ),
    (
        "cyberQ6",
        "Have you heard of encryption?",
        "Data Encryption Fundamentals",
        "encryption",
    ),
    (
        "cyberQ7",
        "Do you know what multifactor authentication means?",
        "Authentication Methods and Security",
        "encryption",
    ),
    (
        "cyberQ8",
        "Do you know what a secure website looks like in your browser?",
        "Web Security Indicators",
        "networking",
    ),
    (
        "cyberQ9",
        "Are you familiar with what DNS is?",
        "DNS and Network Security",
        "networking",
    ),
    (
        "cyberQ10",
        "Are you familiar with what an \"endpoint\" refers to in cybersecurity?",
        "Endpoint Security Fundamentals",
        "endpointSecurity",
    ),
];

// (title, description, duration, difficulty, topics)
type CourseRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static [&'static str],
);

const COURSE_CATALOG: &[CourseRow] = &[
    (
        "Computer Basics 101",
        "Learn the fundamentals of operating computers, from power functions to basic navigation.",
        "4 weeks",
        "Beginner",
        &["Computer Hardware", "Operating Systems", "File Management", "Basic Troubleshooting"],
    ),
    (
        "Introduction to Cybersecurity",
        "Understand the core concepts of cybersecurity and why it's important in today's digital world.",
        "6 weeks",
        "Beginner",
        &["Security Principles", "Common Threats", "Basic Protection Methods", "Security Mindset"],
    ),
    (
        "Networking Fundamentals",
        "Learn how computer networks work and how data travels between devices.",
        "8 weeks",
        "Beginner",
        &["Network Types", "Network Hardware", "IP Addressing", "Network Protocols"],
    ),
    (
        "IP Addressing and Subnetting",
        "Master the concepts of IP addressing and how to implement subnetting in networks.",
        "6 weeks",
        "Intermediate",
        &["IPv4 Addressing", "Subnet Masks", "CIDR Notation", "Subnet Calculations"],
    ),
    (
        "Network Diagnostics and Troubleshooting",
        "Learn how to diagnose and resolve common network issues using industry-standard tools.",
        "5 weeks",
        "Intermediate",
        &["Diagnostic Tools", "Command Line Utilities", "Network Monitoring", "Problem Resolution"],
    ),
    (
        "Password Security Best Practices",
        "Learn how to create strong passwords and manage them securely.",
        "3 weeks",
        "Beginner",
        &["Password Creation", "Password Management Tools", "Multi-Factor Authentication", "Security Policies"],
    ),
    (
        "Common Cyber Threats and Attacks",
        "Understand the most common threats in cybersecurity and how they work.",
        "5 weeks",
        "Beginner-Intermediate",
        &["Phishing", "Malware", "Social Engineering", "Ransomware", "Data Breaches"],
    ),
    (
        "Data Encryption Fundamentals",
        "Learn the basics of encryption and how it protects your data.",
        "4 weeks",
        "Intermediate",
        &["Encryption Concepts", "Symmetric vs Asymmetric", "TLS/SSL", "Encryption Applications"],
    ),
    (
        "DNS and Network Security",
        "Understand DNS and its role in network security.",
        "4 weeks",
        "Intermediate",
        &["DNS Fundamentals", "DNS Security Extensions", "DNS Attacks", "Secure DNS Configuration"],
    ),
    (
        "Endpoint Security Fundamentals",
        "Learn how to secure endpoints in your network from cyber threats.",
        "5 weeks",
        "Intermediate",
        &["Endpoint Protection", "Antivirus Solutions", "Device Management", "Security Policies"],
    ),
];

/// General questions, role tracks and the course catalog.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    pub general: Vec<Question>,
    pub roles: Vec<RoleTrack>,
    pub catalog: BTreeMap<String, CourseDetails>,
}

impl QuestionBank {
    /// The bank shipped with the service: two role tracks, ten questions each.
    pub fn builtin() -> Self {
        let roles = vec![
            RoleTrack {
                id: "networkAdmin".to_string(),
                name: "Network Administration".to_string(),
                sheet_name: "Network Administrator".to_string(),
                id_marker: "network".to_string(),
                questions: to_questions(NETWORK_ADMIN_QUESTIONS),
            },
            RoleTrack {
                id: "cybersecurity".to_string(),
                name: "Cybersecurity".to_string(),
                sheet_name: "Cybersecurity".to_string(),
                id_marker: "cyber".to_string(),
                questions: to_questions(CYBERSECURITY_QUESTIONS),
            },
        ];

        let catalog = COURSE_CATALOG
            .iter()
            .map(|(title, description, duration, difficulty, topics)| {
                (
                    title.to_string(),
                    CourseDetails {
                        title: title.to_string(),
                        description: description.to_string(),
                        duration: duration.to_string(),
                        difficulty: difficulty.to_string(),
                        topics: topics.iter().map(|t| t.to_string()).collect(),
                    },
                )
            })
            .collect();

        Self {
            general: to_questions(GENERAL_QUESTIONS),
            roles,
            catalog,
        }
    }

    pub fn role(&self, role_id: &str) -> Option<&RoleTrack> {
        self.roles.iter().find(|r| r.id == role_id)
    }

    /// Catalog lookup. Several recommended courses have no entry; callers get `None`.
    pub fn course(&self, course_id: &str) -> Option<&CourseDetails> {
        self.catalog.get(course_id)
    }
}

fn to_questions(rows: &[QuestionRow]) -> Vec<Question> {
    rows.iter()
        .map(|(id, text, course, category)| Question::new(id, text, category, course))
        .collect()
}

/// Returns the `batch`-th slice of `BATCH_SIZE` questions, empty past the end.
pub fn batch_slice(questions: &[Question], batch: u8) -> &[Question] {
    let start = (batch as usize * BATCH_SIZE).min(questions.len());
    let end = (start + BATCH_SIZE).min(questions.len());
    &questions[start..end]
}
